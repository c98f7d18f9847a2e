//! # Cart Store
//!
//! The in-memory cart and its link to storage.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartStore Mutation                               │
//! │                                                                         │
//! │  add_to_cart / increment / decrement                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────── lock ────────────────────┐                      │
//! │  │  clone current Cart                           │                      │
//! │  │  apply change ──► unchanged? return Ok(())    │                      │
//! │  │  encode snapshot                              │                      │
//! │  │  revision += 1                                │                      │
//! │  │  publish (watch::Sender::send_replace)        │                      │
//! │  │  enqueue Save{revision, payload}              │                      │
//! │  └───────────────────────────────────────────────┘                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  return Ok(())   (the write happens later, in the writer task)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup
//! [`CartStore::open`] reads the snapshot under the storage key and adopts it
//! as the initial cart. A missing key means an empty cart; a malformed value
//! is an error and the store is not created. Loading never triggers a save.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gomarket_core::{snapshot, Cart, NewItem};
use gomarket_db::KeyValueStore;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{CartConfig, CartSettings};
use crate::error::{CartError, CartResult};
use crate::writer::{self, PersistenceStatus, WriteJob};

/// Immutable view of the cart handed to consumers.
pub type CartSnapshot = Arc<Cart>;

/// Owner of the cart state.
///
/// `Send + Sync`; share it behind an `Arc` (see [`crate::CartProvider`]).
#[derive(Debug)]
pub struct CartStore {
    /// Current cart, published to subscribers.
    state: watch::Sender<CartSnapshot>,

    /// Serializes mutations and owns the writer handle.
    inner: Mutex<Inner>,

    /// Writer outcome counters.
    status: watch::Receiver<PersistenceStatus>,

    /// Storage key the snapshot lives under.
    key: String,
}

#[derive(Debug)]
struct Inner {
    /// Bumped on every published change.
    revision: u64,
    writer: Option<mpsc::UnboundedSender<WriteJob>>,
    task: Option<JoinHandle<()>>,
}

impl CartStore {
    /// Loads the persisted cart and starts the snapshot writer.
    ///
    /// ## Errors
    /// * `CartError::Storage` - the storage read failed
    /// * `CartError::Core` - the stored snapshot is malformed
    pub async fn open(storage: Arc<dyn KeyValueStore>, settings: &CartSettings) -> CartResult<Self> {
        let key = settings.storage_key.clone();

        let raw = storage.get(&key).await?;
        let cart = snapshot::decode_optional(raw.as_deref()).map_err(|e| {
            error!(key = %key, error = %e, "Stored cart snapshot is malformed");
            e
        })?;

        info!(
            key = %key,
            items = cart.len(),
            quantity = cart.total_quantity(),
            "Cart loaded from storage"
        );

        let (tx, status, task) = writer::spawn(storage, key.clone(), settings.coalesce_writes);
        let (state, _) = watch::channel(Arc::new(cart));

        Ok(CartStore {
            state,
            inner: Mutex::new(Inner {
                revision: 0,
                writer: Some(tx),
                task: Some(task),
            }),
            status,
            key,
        })
    }

    /// Connects the configured backend and opens the store on it.
    pub async fn open_with_config(config: &CartConfig) -> CartResult<Self> {
        config.validate()?;
        let storage = config.connect_storage().await?;
        Self::open(storage, &config.cart).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the current cart.
    pub fn products(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// Returns a receiver that sees every published cart.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    /// Number of changes published since the store was opened.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Storage key the snapshot is written under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Returns the writer's outcome counters.
    pub fn persistence_status(&self) -> PersistenceStatus {
        self.status.borrow().clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of a product.
    ///
    /// An existing id gets its quantity bumped and keeps its original
    /// title, image and price. A new id is appended with quantity 1.
    pub fn add_to_cart(&self, item: NewItem) -> CartResult<()> {
        self.apply("add_to_cart", |cart| Ok(cart.add(item)?))
    }

    /// Adds one to the quantity of `id`. Unknown ids are ignored.
    pub fn increment(&self, id: &str) -> CartResult<()> {
        self.apply("increment", |cart| Ok(cart.increment(id)))
    }

    /// Removes one from the quantity of `id`, dropping it at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&self, id: &str) -> CartResult<()> {
        self.apply("decrement", |cart| Ok(cart.decrement(id)))
    }

    fn apply<F>(&self, op: &'static str, change: F) -> CartResult<()>
    where
        F: FnOnce(&mut Cart) -> CartResult<bool>,
    {
        let mut inner = self.lock();

        let mut cart = Cart::clone(&self.state.borrow());
        if !change(&mut cart)? {
            debug!(op, "Cart unchanged");
            return Ok(());
        }

        let payload = snapshot::encode(&cart)?;
        inner.revision += 1;
        let revision = inner.revision;

        debug!(op, revision, items = cart.len(), "Publishing cart");
        self.state.send_replace(Arc::new(cart));

        let queued = inner
            .writer
            .as_ref()
            .map(|tx| tx.send(WriteJob::Save { revision, payload }).is_ok())
            .unwrap_or(false);

        if !queued {
            warn!(op, revision, "Snapshot writer stopped, change kept in memory only");
        }

        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Waits until every snapshot queued so far has been handled.
    ///
    /// ## Errors
    /// `CartError::WriterStopped` once the store has been closed.
    pub async fn flush(&self) -> CartResult<()> {
        let (ack, done) = oneshot::channel();

        {
            let inner = self.lock();
            let tx = inner.writer.as_ref().ok_or(CartError::WriterStopped)?;
            tx.send(WriteJob::Flush(ack))
                .map_err(|_| CartError::WriterStopped)?;
        }

        done.await.map_err(|_| CartError::WriterStopped)
    }

    /// Writes out pending snapshots and stops the writer.
    ///
    /// Later mutations still update memory but are not persisted. Calling
    /// close twice is harmless.
    pub async fn close(&self) -> CartResult<()> {
        let (writer, task) = {
            let mut inner = self.lock();
            (inner.writer.take(), inner.task.take())
        };

        if writer.is_none() {
            return Ok(());
        }

        // The writer drains the queue and exits once its sender is gone
        drop(writer);

        if let Some(task) = task {
            task.await.map_err(|e| {
                error!(error = %e, "Snapshot writer task failed");
                CartError::WriterStopped
            })?;
        }

        info!(key = %self.key, "Cart store closed");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gomarket_core::Item;
    use gomarket_db::{Database, DbConfig, DbError, DbResult, MemoryStore};
    use std::path::PathBuf;

    const KEY: &str = "@GoMarketplace:products";

    fn shirt() -> NewItem {
        NewItem::new("p1", "Shirt", "u", 10.0)
    }

    fn settings(coalesce: bool) -> CartSettings {
        CartSettings {
            storage_key: KEY.to_string(),
            coalesce_writes: coalesce,
        }
    }

    async fn open_memory() -> (CartStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::open(storage.clone(), &settings(true)).await.unwrap();
        (store, storage)
    }

    fn quantities(store: &CartStore) -> Vec<(String, u32)> {
        store
            .products()
            .iter()
            .map(|item| (item.id.clone(), item.quantity))
            .collect()
    }

    /// Records every value written, in order.
    #[derive(Default)]
    struct RecordingStore {
        writes: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl KeyValueStore for RecordingStore {
        async fn get(&self, _key: &str) -> DbResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, value: &str) -> DbResult<()> {
            self.writes.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    /// Reads work, writes fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> DbResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> DbResult<()> {
            Err(DbError::Unavailable("read-only".to_string()))
        }
    }

    /// Nothing works.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> DbResult<Option<String>> {
            Err(DbError::ConnectionFailed("no database".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> DbResult<()> {
            Err(DbError::ConnectionFailed("no database".to_string()))
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    #[tokio::test]
    async fn test_add_decrement_walkthrough() {
        let (store, storage) = open_memory().await;
        assert!(store.products().is_empty());

        // Scenario A
        store.add_to_cart(shirt()).unwrap();
        let cart = store.products();
        assert_eq!(cart.len(), 1);
        let item = cart.get("p1").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, 10.0);
        assert_eq!(item.title, "Shirt");

        // Scenario B
        store.add_to_cart(shirt()).unwrap();
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);

        // Scenario C
        store.decrement("p1").unwrap();
        assert_eq!(quantities(&store), vec![("p1".to_string(), 1)]);

        // Scenario D
        store.decrement("p1").unwrap();
        assert!(store.products().is_empty());

        store.flush().await.unwrap();
        assert_eq!(storage.get(KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_restart_loads_persisted_cart() {
        let storage = Arc::new(MemoryStore::new());

        let store = CartStore::open(storage.clone(), &settings(true)).await.unwrap();
        store.add_to_cart(NewItem::new("p2", "Hat", "h", 5.5)).unwrap();
        store.increment("p2").unwrap();
        store.increment("p2").unwrap();
        store.close().await.unwrap();
        let before = store.products();

        // Scenario E
        let reopened = CartStore::open(storage, &settings(true)).await.unwrap();
        assert_eq!(*reopened.products(), *before);
        assert_eq!(quantities(&reopened), vec![("p2".to_string(), 3)]);
        assert_eq!(reopened.revision(), 0);
    }

    #[tokio::test]
    async fn test_load_does_not_save() {
        let raw = r#"[{"id":"p1","title":"Shirt","imageUrl":"u","price":10,"quantity":2}]"#;
        let storage = Arc::new(MemoryStore::with_entry(KEY, raw));

        let store = CartStore::open(storage.clone(), &settings(true)).await.unwrap();
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);

        store.flush().await.unwrap();
        assert_eq!(store.persistence_status().writes, 0);
        assert_eq!(storage.get(KEY).await.unwrap().as_deref(), Some(raw));
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[tokio::test]
    async fn test_repeated_adds_never_duplicate() {
        let (store, _) = open_memory().await;

        for id in ["a", "b", "a", "c", "b", "a"] {
            store.add_to_cart(NewItem::new(id, id, "", 1.0)).unwrap();
        }

        assert_eq!(
            quantities(&store),
            vec![
                ("a".to_string(), 3),
                ("b".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_add_existing_keeps_original_fields() {
        let (store, _) = open_memory().await;

        store.add_to_cart(shirt()).unwrap();
        store
            .add_to_cart(NewItem::new("p1", "Renamed", "other", 99.0))
            .unwrap();

        let cart = store.products();
        let item = cart.get("p1").unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.title, "Shirt");
        assert_eq!(item.image_url, "u");
        assert_eq!(item.price, 10.0);
    }

    #[tokio::test]
    async fn test_decrement_never_leaves_zero_quantity() {
        let (store, _) = open_memory().await;
        store.add_to_cart(shirt()).unwrap();
        store.add_to_cart(NewItem::new("p2", "Hat", "h", 5.0)).unwrap();

        for _ in 0..3 {
            store.decrement("p1").unwrap();
            assert!(store.products().iter().all(|item| item.quantity >= 1));
        }

        assert_eq!(quantities(&store), vec![("p2".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_a_no_op() {
        let (store, _) = open_memory().await;
        store.add_to_cart(shirt()).unwrap();
        let before = store.products();
        let revision = store.revision();
        let changes = store.subscribe();

        store.increment("missing").unwrap();
        store.decrement("missing").unwrap();

        assert_eq!(*store.products(), *before);
        assert_eq!(store.revision(), revision);
        assert!(!changes.has_changed().unwrap());

        store.flush().await.unwrap();
        assert_eq!(store.persistence_status().persisted_revision, revision);
    }

    #[tokio::test]
    async fn test_add_existing_ignores_descriptor_price() {
        let (store, _) = open_memory().await;
        store.add_to_cart(shirt()).unwrap();

        store
            .add_to_cart(NewItem::new("p1", "Shirt", "u", f64::NAN))
            .unwrap();

        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);
        assert_eq!(store.products().get("p1").unwrap().price, 10.0);
        assert_eq!(store.revision(), 2);
    }

    #[tokio::test]
    async fn test_invalid_item_is_rejected_without_change() {
        let (store, _) = open_memory().await;

        let err = store
            .add_to_cart(NewItem::new("", "Nameless", "", 1.0))
            .unwrap_err();
        assert!(matches!(err, CartError::Core(_)));

        assert!(store
            .add_to_cart(NewItem::new("p9", "Free", "", f64::NAN))
            .is_err());

        assert!(store.products().is_empty());
        assert_eq!(store.revision(), 0);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[tokio::test]
    async fn test_writes_follow_mutation_order() {
        let storage = Arc::new(RecordingStore::default());
        let store = CartStore::open(storage.clone(), &settings(false)).await.unwrap();

        store.add_to_cart(shirt()).unwrap();
        store.add_to_cart(shirt()).unwrap();
        store.decrement("p1").unwrap();
        store.decrement("p1").unwrap();
        store.flush().await.unwrap();

        let writes = storage.writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 4);
        assert!(writes[0].contains(r#""quantity":1"#));
        assert!(writes[1].contains(r#""quantity":2"#));
        assert!(writes[2].contains(r#""quantity":1"#));
        assert_eq!(writes[3], "[]");

        let status = store.persistence_status();
        assert_eq!(status.persisted_revision, 4);
        assert_eq!(status.writes, 4);
    }

    #[tokio::test]
    async fn test_burst_is_coalesced_to_latest() {
        let (store, storage) = open_memory().await;

        // No await between mutations, so the writer sees them all queued
        for _ in 0..10 {
            store.add_to_cart(shirt()).unwrap();
        }
        store.flush().await.unwrap();

        let status = store.persistence_status();
        assert_eq!(status.writes, 1);
        assert_eq!(status.skipped, 9);
        assert_eq!(status.persisted_revision, 10);

        let stored = storage.get(KEY).await.unwrap().unwrap();
        let cart = snapshot::decode(&stored).unwrap();
        assert_eq!(cart, *store.products());
    }

    #[tokio::test]
    async fn test_write_failure_does_not_fail_mutation() {
        let store = CartStore::open(Arc::new(ReadOnlyStore), &settings(false))
            .await
            .unwrap();

        store.add_to_cart(shirt()).unwrap();
        store.increment("p1").unwrap();
        store.flush().await.unwrap();

        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);

        let status = store.persistence_status();
        assert_eq!(status.failures, 2);
        assert_eq!(status.persisted_revision, 0);
        assert!(status.is_degraded());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_fails_open() {
        let storage = Arc::new(MemoryStore::with_entry(KEY, "{not json"));
        let err = CartStore::open(storage, &settings(true)).await.unwrap_err();
        assert!(err.is_malformed_snapshot());

        let duplicate = r#"[
            {"id":"p1","title":"A","image_url":"","price":1,"quantity":1},
            {"id":"p1","title":"B","image_url":"","price":1,"quantity":1}
        ]"#;
        let storage = Arc::new(MemoryStore::with_entry(KEY, duplicate));
        let err = CartStore::open(storage, &settings(true)).await.unwrap_err();
        assert!(err.is_malformed_snapshot());
    }

    #[tokio::test]
    async fn test_storage_read_failure_fails_open() {
        let err = CartStore::open(Arc::new(BrokenStore), &settings(true))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
    }

    #[tokio::test]
    async fn test_mutations_after_close_stay_in_memory() {
        let (store, storage) = open_memory().await;
        store.add_to_cart(shirt()).unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();

        store.increment("p1").unwrap();
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);
        assert!(matches!(store.flush().await, Err(CartError::WriterStopped)));

        let stored = storage.get(KEY).await.unwrap().unwrap();
        assert!(stored.contains(r#""quantity":1"#));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (store, _) = open_memory().await;
        let mut changes = store.subscribe();

        store.add_to_cart(shirt()).unwrap();

        assert!(changes.has_changed().unwrap());
        let seen: Vec<Item> = changes.borrow_and_update().items().to_vec();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].id, "p1");
    }

    #[tokio::test]
    async fn test_sqlite_restart_round_trip() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path: PathBuf = std::env::temp_dir().join(format!(
            "gomarket-cart-store-{}-{}.db",
            std::process::id(),
            nanos
        ));

        let db = Database::new(DbConfig::new(path.clone())).await.unwrap();
        let store = CartStore::open(Arc::new(db.clone()), &settings(true)).await.unwrap();
        store.add_to_cart(shirt()).unwrap();
        store.add_to_cart(NewItem::new("p2", "Hat", "h", 5.0)).unwrap();
        store.increment("p2").unwrap();
        store.close().await.unwrap();
        let before = store.products();
        db.close().await;

        let db = Database::new(DbConfig::new(path.clone())).await.unwrap();
        let reopened = CartStore::open(Arc::new(db.clone()), &settings(true)).await.unwrap();
        assert_eq!(*reopened.products(), *before);
        reopened.close().await.unwrap();
        db.close().await;

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_open_with_memory_config() {
        let store = CartStore::open_with_config(&CartConfig::in_memory())
            .await
            .unwrap();

        assert_eq!(store.storage_key(), KEY);
        store.add_to_cart(shirt()).unwrap();
        store.flush().await.unwrap();
        assert_eq!(store.persistence_status().persisted_revision, 1);
    }
}
