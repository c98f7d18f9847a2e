//! # Key-Value Repository
//!
//! SQL access to the `kv_store` table.
//!
//! ## Table Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kv_store                                                               │
//! │  ─────────────────────────┬──────────────────────┬─────────────────────│
//! │  key (PK)                 │ value                │ updated_at          │
//! │  @GoMarketplace:products  │ [{"id":"p1",...}]    │ 2026-10-16T...      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `set` is an upsert, so a key always holds exactly one row: the last
//! value written.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for key-value records.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Gets the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Stores `value` under `key`, replacing any existing row.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = value.len(), "Writing key-value record");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes `key`.
    ///
    /// ## Returns
    /// `true` if a row was removed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all stored keys, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Returns when `key` was last written.
    pub async fn updated_at(&self, key: &str) -> DbResult<Option<DateTime<Utc>>> {
        let stamp: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(stamp)
    }
}
