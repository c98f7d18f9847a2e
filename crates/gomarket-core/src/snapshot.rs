//! # Snapshot Codec
//!
//! Converts a [`Cart`] to and from the string stored under the cart key.
//!
//! ## Format
//! A JSON array of item records, in cart order:
//!
//! ```json
//! [
//!   { "id": "p1", "title": "Shirt", "image_url": "u", "price": 10.0, "quantity": 2 }
//! ]
//! ```
//!
//! Decoding is strict: anything that is not such an array, or that breaks
//! the cart invariants, is a [`CoreError::MalformedSnapshot`]. An empty
//! string is read as "no snapshot".

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::types::Item;

/// Encodes a cart as its stored snapshot string.
pub fn encode(cart: &Cart) -> CoreResult<String> {
    serde_json::to_string(cart).map_err(|e| CoreError::EncodeFailed(e.to_string()))
}

/// Decodes a stored snapshot string.
///
/// ## Returns
/// - `Ok(Cart)` - empty for a blank string
/// - `Err(CoreError::MalformedSnapshot)` - bad JSON, wrong shape, or
///   duplicate ids / zero quantities
pub fn decode(raw: &str) -> CoreResult<Cart> {
    if raw.trim().is_empty() {
        return Ok(Cart::new());
    }

    let items: Vec<Item> =
        serde_json::from_str(raw).map_err(|e| CoreError::malformed(e.to_string()))?;

    Cart::from_items(items).map_err(|e| CoreError::malformed(e.to_string()))
}

/// Decodes an optional snapshot, treating `None` as an empty cart.
pub fn decode_optional(raw: Option<&str>) -> CoreResult<Cart> {
    match raw {
        Some(raw) => decode(raw),
        None => Ok(Cart::new()),
    }
}
