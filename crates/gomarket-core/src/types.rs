//! # Line Item Types
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Line Item Types                                 │
//! │                                                                         │
//! │  ┌─────────────────┐                  ┌─────────────────┐               │
//! │  │    NewItem      │   Cart::add()    │      Item       │               │
//! │  │  ─────────────  │ ───────────────► │  ─────────────  │               │
//! │  │  id             │  quantity = 1    │  id             │               │
//! │  │  title          │                  │  title          │               │
//! │  │  image_url      │                  │  image_url      │               │
//! │  │  price          │                  │  price          │               │
//! │  └─────────────────┘                  │  quantity ≥ 1   │               │
//! │                                       └─────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Names
//! The serialized field names (`id`, `title`, `image_url`, `price`,
//! `quantity`) are the persisted snapshot format. `imageUrl` is accepted on
//! read for snapshots written by older clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Item
// =============================================================================

/// One product line in the cart.
///
/// Everything except `quantity` is frozen at the moment the product is first
/// added; adding the same id again never rewrites title, image or price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Opaque product identifier, unique within a cart.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Product image location.
    #[serde(alias = "imageUrl")]
    pub image_url: String,

    /// Unit price as supplied by the catalog.
    pub price: f64,

    /// Number of units, at least 1 while the item is in the cart.
    pub quantity: u32,
}

impl Item {
    /// Creates an item with a quantity of one from an add-time descriptor.
    pub fn from_new(item: NewItem) -> Self {
        Item {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }
}

// =============================================================================
// NewItem
// =============================================================================

/// An item descriptor without a quantity, as passed to `add_to_cart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub id: String,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: f64,
}

impl NewItem {
    /// Creates a new descriptor.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<NewItem> for Item {
    fn from(item: NewItem) -> Self {
        Item::from_new(item)
    }
}
