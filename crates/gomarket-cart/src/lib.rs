//! # gomarket-cart: Cart Store Service
//!
//! Keeps the shopping cart in memory for the lifetime of a session and
//! mirrors every change into key-value storage so the cart survives a
//! restart.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Flow                               │
//! │                                                                         │
//! │  UI components                                                         │
//! │       │  products() / add_to_cart() / increment() / decrement()        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 gomarket-cart (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   CartProvider ──► CartStore ──► watch (published Arc<Cart>)   │   │
//! │  │                        │                                        │   │
//! │  │                        └──► mpsc ──► snapshot writer task       │   │
//! │  │                                                                 │   │
//! │  │   CartConfig (toml + env)        init_tracing()                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                       │                         │
//! │       ▼                                       ▼                         │
//! │  gomarket-core                           gomarket-db                    │
//! │  (Cart rules, snapshot codec)            (KeyValueStore: SQLite/memory) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gomarket_cart::{init_tracing, CartConfig, CartProvider, CartStore};
//! use gomarket_core::NewItem;
//!
//! init_tracing();
//! let config = CartConfig::load(None)?;
//! let store = Arc::new(CartStore::open_with_config(&config).await?);
//! let provider = CartProvider::new(store.clone());
//!
//! provider.add_to_cart(NewItem::new("p1", "Shirt", "https://...", 10.0))?;
//!
//! store.close().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod telemetry;
mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, CartSettings, StorageBackend, StorageSettings};
pub use error::{CartError, CartResult};
pub use provider::CartProvider;
pub use store::{CartSnapshot, CartStore};
pub use telemetry::init_tracing;
pub use writer::PersistenceStatus;
