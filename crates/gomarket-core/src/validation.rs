//! # Validation Module
//!
//! Input and snapshot validation for the cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  add_to_cart(NewItem)                                                  │
//! │  └── validate_new_item: id present, price finite                       │
//! │                                                                         │
//! │  load snapshot                                                         │
//! │  └── validate_items: unique ids, quantity ≥ 1                          │
//! │                                                                         │
//! │  The cart itself never checks stock or prices; it records what the     │
//! │  catalog hands it.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::validate_new_item;
//! use gomarket_core::NewItem;
//!
//! assert!(validate_new_item(&NewItem::new("p1", "Shirt", "u", 10.0)).is_ok());
//! assert!(validate_new_item(&NewItem::new("", "Shirt", "u", 10.0)).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Item, NewItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be a finite number. NaN and infinities have no JSON form and
///   would come back from storage as a different value.
/// - Negative and zero prices are recorded as given.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    Ok(())
}

/// Validates an add-time item descriptor.
pub fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    validate_item_id(&item.id)?;
    validate_price(item.price)?;
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a decoded list of items against the cart invariants.
///
/// ## Rules
/// - No two items share an id
/// - Every quantity is at least 1
/// - Every id and price passes the field validators
pub fn validate_items(items: &[Item]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_item_id(&item.id)?;
        validate_price(item.price)?;

        if item.quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity of '{}'", item.id),
            });
        }

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
