//! Error types for the key-value store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for every store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key or prefix is syntactically invalid, or would escape the storage root
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key is absent or has expired
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Configuration is missing a required field or names an unknown backend
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Underlying filesystem failure other than a missing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns true for the recoverable "absent or expired" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, StoreError>;
