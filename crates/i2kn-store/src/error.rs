//! Error types for the store module.

use i2kn_core::CoreError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry under this key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Key is not a single path component.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// The storage root still has entries.
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// Envelope JSON or its public key is unreadable.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
