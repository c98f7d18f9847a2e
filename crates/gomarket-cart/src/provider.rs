//! # Cart Provider
//!
//! Consumer-side access to a [`CartStore`].
//!
//! A UI builds one provider at its root with the store it opened, then
//! clones it into every component that reads or changes the cart. A
//! provider built without a store (for example a component rendered
//! outside the cart scope) fails every call with
//! [`CartError::NotInitialized`] instead of pretending the cart is empty.
//!
//! ```rust,ignore
//! let store = Arc::new(CartStore::open_with_config(&config).await?);
//! let provider = CartProvider::new(store);
//!
//! provider.add_to_cart(NewItem::new("p1", "Shirt", "https://...", 10.0))?;
//! let cart = provider.products()?;
//! ```

use std::sync::Arc;

use gomarket_core::NewItem;
use tokio::sync::watch;

use crate::error::{CartError, CartResult};
use crate::store::{CartSnapshot, CartStore};

/// Shared handle consumers use to reach the cart.
#[derive(Debug, Clone, Default)]
pub struct CartProvider {
    store: Option<Arc<CartStore>>,
}

impl CartProvider {
    /// Creates a provider scoped to `store`.
    pub fn new(store: Arc<CartStore>) -> Self {
        CartProvider { store: Some(store) }
    }

    /// Creates a provider with no store behind it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if a store is attached.
    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the attached store.
    pub fn store(&self) -> CartResult<&Arc<CartStore>> {
        self.store.as_ref().ok_or(CartError::NotInitialized)
    }

    /// Current cart contents.
    pub fn products(&self) -> CartResult<CartSnapshot> {
        Ok(self.store()?.products())
    }

    /// See [`CartStore::add_to_cart`].
    pub fn add_to_cart(&self, item: NewItem) -> CartResult<()> {
        self.store()?.add_to_cart(item)
    }

    /// See [`CartStore::increment`].
    pub fn increment(&self, id: &str) -> CartResult<()> {
        self.store()?.increment(id)
    }

    /// See [`CartStore::decrement`].
    pub fn decrement(&self, id: &str) -> CartResult<()> {
        self.store()?.decrement(id)
    }

    /// Change feed for the cart.
    pub fn subscribe(&self) -> CartResult<watch::Receiver<CartSnapshot>> {
        Ok(self.store()?.subscribe())
    }
}

impl From<Arc<CartStore>> for CartProvider {
    fn from(store: Arc<CartStore>) -> Self {
        CartProvider::new(store)
    }
}
