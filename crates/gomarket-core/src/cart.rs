//! # Cart
//!
//! The ordered collection of line items and its three mutations.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add(NewItem)                                                          │
//! │   ├── id already present ──► same as increment(id)                     │
//! │   └── new id ─────────────► push Item { quantity: 1 } at the end       │
//! │                                                                         │
//! │  increment(id)                                                         │
//! │   ├── id present ─────────► quantity += 1                              │
//! │   └── unknown id ─────────► no change                                  │
//! │                                                                         │
//! │  decrement(id)                                                         │
//! │   ├── id present ─────────► quantity -= 1, then drop every item        │
//! │   │                         whose quantity reached 0                   │
//! │   └── unknown id ─────────► no change                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each mutation reports whether the cart changed so the caller can skip
//! publishing and persisting no-ops.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Item, NewItem};
use crate::validation::{validate_items, validate_new_item, ValidationResult};

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same id increases quantity)
/// - Every quantity is ≥ 1 (an item reaching 0 is removed)
/// - Insertion order is preserved
///
/// Serializes as a bare JSON array of items, which is the stored snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Item>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from already-decoded items, checking the invariants.
    pub fn from_items(items: Vec<Item>) -> ValidationResult<Self> {
        validate_items(&items)?;
        Ok(Cart { items })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product to the cart or increases its quantity if present.
    ///
    /// ## Behavior
    /// - If the id is already in the cart: same as [`Cart::increment`]. The
    ///   descriptor is not looked at beyond its id, so the stored title,
    ///   image and price are kept.
    /// - Otherwise: validated, then appended with quantity 1.
    ///
    /// ## Returns
    /// - `Ok(true)` if the cart changed
    /// - `Ok(false)` if an existing quantity is already at its maximum
    /// - `Err(ValidationError)` if a new descriptor has an empty id or a
    ///   non-finite price; the cart is left untouched
    pub fn add(&mut self, item: NewItem) -> ValidationResult<bool> {
        if self.contains(&item.id) {
            return Ok(self.increment(&item.id));
        }

        validate_new_item(&item)?;
        self.items.push(Item::from_new(item));
        Ok(true)
    }

    /// Increases the quantity of the item with `id` by one.
    ///
    /// Returns `false` when no item has that id or its quantity is already
    /// `u32::MAX`.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) if item.quantity < u32::MAX => {
                item.quantity += 1;
                true
            }
            _ => false,
        }
    }

    /// Decreases the quantity of the item with `id` by one.
    ///
    /// After the decrement the floor is enforced over the whole cart: any
    /// item left with quantity 0 is removed, not only the targeted one.
    ///
    /// Returns `false` when no item has that id.
    pub fn decrement(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };

        item.quantity = item.quantity.saturating_sub(1);
        self.items.retain(|i| i.quantity > 0);
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Returns an iterator over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns true if an item with this id is in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total number of units across all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Deserializes through [`Cart::from_items`] so a decoded cart always
/// holds the invariants.
impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Cart::from_items(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt() -> NewItem {
        NewItem::new("p1", "Shirt", "u", 10.0)
    }

    fn mug() -> NewItem {
        NewItem::new("p2", "Mug", "https://img/p2.png", 4.5)
    }

    #[test]
    fn test_add_new_item() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();

        assert_eq!(cart.len(), 1);
        let item = cart.get("p1").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, 10.0);
        assert_eq!(item.title, "Shirt");
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();
        cart.add(shirt()).unwrap();

        assert_eq!(cart.len(), 1); // Still one line
        assert_eq!(cart.get("p1").unwrap().quantity, 2);
    }

    #[test]
    fn test_add_existing_keeps_original_fields() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();
        cart.add(NewItem::new("p1", "Renamed", "other", 99.0)).unwrap();

        let item = cart.get("p1").unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.title, "Shirt");
        assert_eq!(item.image_url, "u");
        assert_eq!(item.price, 10.0);
    }

    #[test]
    fn test_add_existing_ignores_invalid_descriptor() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();

        assert!(cart.add(NewItem::new("p1", "Shirt", "u", f64::NAN)).unwrap());
        assert!(cart.add(NewItem::new("p1", "", "", f64::INFINITY)).unwrap());

        let item = cart.get("p1").unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price, 10.0);
    }

    #[test]
    fn test_increment_at_max_reports_no_change() {
        let mut item = Item::from_new(shirt());
        item.quantity = u32::MAX;
        let mut cart = Cart::from_items(vec![item]).unwrap();

        assert!(!cart.increment("p1"));
        assert!(!cart.add(shirt()).unwrap());
        assert_eq!(cart.get("p1").unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_add_preserves_order() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();
        cart.add(mug()).unwrap();
        cart.add(shirt()).unwrap();

        let ids: Vec<&str> = cart.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_add_rejects_invalid_item() {
        let mut cart = Cart::new();
        assert!(cart.add(NewItem::new("", "Shirt", "u", 10.0)).is_err());
        assert!(cart.add(NewItem::new("p1", "Shirt", "u", f64::NAN)).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();

        assert!(cart.increment("p1"));
        assert_eq!(cart.get("p1").unwrap().quantity, 2);

        assert!(cart.decrement("p1"));
        assert_eq!(cart.get("p1").unwrap().quantity, 1);
    }

    #[test]
    fn test_decrement_to_zero_removes_item() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();
        cart.add(mug()).unwrap();

        assert!(cart.decrement("p1"));
        assert!(!cart.contains("p1"));
        assert!(cart.contains("p2"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();
        let before = cart.clone();

        assert!(!cart.increment("missing"));
        assert!(!cart.decrement("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_uniqueness_over_many_adds() {
        let mut cart = Cart::new();
        for n in 0..50 {
            let id = format!("p{}", n % 7);
            cart.add(NewItem::new(id, "Item", "u", 1.0)).unwrap();
        }

        assert_eq!(cart.len(), 7);
        assert_eq!(cart.total_quantity(), 50);

        let mut ids: Vec<&str> = cart.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cart.len());
    }

    #[test]
    fn test_floor_holds_over_decrement_sequences() {
        let mut cart = Cart::new();
        cart.add(shirt()).unwrap();
        cart.add(shirt()).unwrap();
        cart.add(mug()).unwrap();

        for id in ["p1", "p2", "p1", "p1", "p2", "p2"] {
            cart.decrement(id);
            assert!(cart.iter().all(|i| i.quantity >= 1));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let item = Item::from_new(shirt());
        assert!(Cart::from_items(vec![item.clone(), item]).is_err());
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let cart: Cart = serde_json::from_str(
            r#"[{"id":"p1","title":"Shirt","image_url":"u","price":10.0,"quantity":2}]"#,
        )
        .unwrap();
        assert_eq!(cart.get("p1").unwrap().quantity, 2);

        let duplicate = r#"[
            {"id":"p1","title":"A","image_url":"","price":1,"quantity":1},
            {"id":"p1","title":"B","image_url":"","price":1,"quantity":1}
        ]"#;
        assert!(serde_json::from_str::<Cart>(duplicate).is_err());

        let zero = r#"[{"id":"p1","title":"A","image_url":"","price":1,"quantity":0}]"#;
        assert!(serde_json::from_str::<Cart>(zero).is_err());
    }
}
