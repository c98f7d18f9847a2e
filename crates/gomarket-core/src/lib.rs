//! # gomarket-core: Pure Cart Logic for GoMarket
//!
//! This crate is the **heart** of the GoMarket cart. It contains the cart
//! state machine and the snapshot format as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI consumer (opaque)                         │   │
//! │  │        products ──► addToCart ──► increment ──► decrement       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartProvider                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gomarket-cart (CartStore)                        │   │
//! │  │        publish snapshot, queue write on the snapshot writer     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │ snapshot  │  │ validation│  │   │
//! │  │   │   Item    │  │   Cart    │  │  encode   │  │   rules   │  │   │
//! │  │   │  NewItem  │  │ add/inc/  │  │  decode   │  │  checks   │  │   │
//! │  │   │           │  │   dec     │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TASKS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gomarket-db (Key-Value Storage)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types (`Item`, `NewItem`)
//! - [`cart`] - The `Cart` state machine
//! - [`snapshot`] - Snapshot encoding for the storage layer
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, NewItem};
//!
//! let mut cart = Cart::new();
//! let shirt = NewItem::new("p1", "Shirt", "https://img/p1.png", 10.0);
//!
//! cart.add(shirt.clone()).unwrap();
//! cart.add(shirt).unwrap();
//! assert_eq!(cart.get("p1").map(|i| i.quantity), Some(2));
//!
//! cart.decrement("p1");
//! cart.decrement("p1");
//! assert!(cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{Item, NewItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key under which the cart snapshot is kept.
///
/// Existing installs already hold data under this key, so it must not change.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";
