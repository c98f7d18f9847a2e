//! # gomarket-db: Storage Layer for GoMarket
//!
//! This crate provides the key-value storage the cart snapshot lives in.
//! It uses SQLite for durable storage with sqlx for async operations, and
//! offers an in-memory store for tests and throwaway sessions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Data Flow                               │
//! │                                                                         │
//! │  CartStore::open (load)        Snapshot writer (save)                  │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   gomarket-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │   Database    │    │  Migrations  │  │   │
//! │  │   │   (kv.rs)     │◄───│   (pool.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ MemoryStore   │    │ KvRepository  │    │ 001_kv_store │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        ~/.local/share/gomarket/gomarket.db (Linux)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - The `KeyValueStore` contract and `MemoryStore`
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - SQL repository for key-value rows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_db::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("path/to/gomarket.db")).await?;
//! db.set("@GoMarketplace:products", "[]").await?;
//! let raw = db.get("@GoMarketplace:products").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use kv::{KeyValueStore, MemoryStore};
pub use pool::{Database, DbConfig};

pub use repository::kv::KvRepository;
