//! # Key-Value Storage Contract
//!
//! The cart persists exactly one string under one key, so the storage
//! layer it talks to is a plain async key-value store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KeyValueStore                                      │
//! │                                                                         │
//! │   get(key)        → Option<String>                                     │
//! │   set(key, value) → ()                                                 │
//! │                                                                         │
//! │   ┌──────────────────────┐        ┌──────────────────────┐             │
//! │   │   Database (SQLite)  │        │     MemoryStore      │             │
//! │   │   kv_store table     │        │  RwLock<HashMap>     │             │
//! │   │   survives restarts  │        │  tests / ephemeral   │             │
//! │   └──────────────────────┘        └──────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DbResult;

/// Async key-value storage used for snapshots.
///
/// Implementations must be shareable across tasks: the cart reads through
/// it on startup and a background writer owns a clone afterwards.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;
}

/// In-process store backed by a `HashMap`.
///
/// Nothing survives the process; two `CartStore`s opened on the same
/// `Arc<MemoryStore>` do see each other's writes, which is how restarts are
/// simulated in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryStore {
            entries: RwLock::new(entries),
        }
    }

    /// Removes `key`, returning true if it was present.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Checks if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
