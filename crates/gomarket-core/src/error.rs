//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Snapshot and domain failures                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gomarket-db errors (separate crate)                                   │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  gomarket-cart errors                                                  │
//! │  └── CartError        - What consumers of the store see                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError ← DbError               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted snapshot could not be turned back into a cart.
    ///
    /// ## When This Occurs
    /// - The stored string is not JSON, or not an array of items
    /// - A record is missing a field or has the wrong type
    /// - The records break a cart invariant (duplicate id, zero quantity)
    ///
    /// Loading never falls back to an empty cart on this error; a corrupt
    /// snapshot is reported so the data is not silently dropped.
    #[error("Malformed cart snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    /// The cart could not be encoded for storage.
    #[error("Failed to encode cart snapshot: {0}")]
    EncodeFailed(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MalformedSnapshot error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        CoreError::MalformedSnapshot {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a NaN price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
