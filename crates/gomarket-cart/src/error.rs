//! # Cart Error Types
//!
//! Errors returned by the cart service.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Usage       │  │     Domain      │  │      Storage            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  NotInitialized │  │  Core           │  │  Storage (load path)    │ │
//! │  │  WriterStopped  │  │  (malformed     │  │                         │ │
//! │  │                 │  │   snapshot,     │  │  Save failures are NOT  │ │
//! │  │                 │  │   validation)   │  │  errors here: they are  │ │
//! │  │                 │  │                 │  │  logged and counted in  │ │
//! │  │                 │  │                 │  │  PersistenceStatus      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  Configuration  │                                                   │
//! │  │  InvalidConfig  │                                                   │
//! │  │  ConfigLoad...  │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_core::{CoreError, ValidationError};
use gomarket_db::DbError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart service error.
#[derive(Debug, Error)]
pub enum CartError {
    /// A consumer called into a provider with no active cart store.
    #[error("Cart is not initialized: no active CartStore for this provider")]
    NotInitialized,

    /// The snapshot writer has been shut down.
    #[error("Snapshot writer is stopped")]
    WriterStopped,

    /// Domain failure (malformed snapshot, rejected input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure while loading.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// Invalid configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for CartError {
    fn from(err: ValidationError) -> Self {
        CartError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

impl CartError {
    /// Returns true if the error comes from a corrupt persisted snapshot.
    pub fn is_malformed_snapshot(&self) -> bool {
        matches!(self, CartError::Core(CoreError::MalformedSnapshot { .. }))
    }
}
