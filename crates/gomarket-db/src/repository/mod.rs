//! # Repository Module
//!
//! Database repository implementations for the SQLite backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Snapshot writer / CartStore::open                                     │
//! │       │                                                                 │
//! │       │  db.kv().get("@GoMarketplace:products")                        │
//! │       ▼                                                                 │
//! │  KvRepository                                                          │
//! │  ├── get(&self, key)                                                   │
//! │  ├── set(&self, key, value)                                            │
//! │  ├── delete(&self, key)                                                │
//! │  └── keys(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (kv_store table)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KvRepository`](kv::KvRepository) - Key-value snapshot records

pub mod kv;
