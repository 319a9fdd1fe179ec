//! Error types for i2kn nodes.

use i2kn_core::CoreError;
use i2kn_store::StoreError;
use thiserror::Error;

/// Errors that can occur during node operations.
///
/// Integrity failures on load are not errors; they are reported through
/// [`crate::LoadResult`] flags.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A facade operation ran before `init`.
    #[error("node is not initialized")]
    Uninitialized,

    #[error("node is already initialized")]
    AlreadyInitialized,

    /// No envelope or clear file under this key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input is not a JSON object or cannot be canonically encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Ciphertext is structurally malformed.
    #[error("decryption error: {0}")]
    Decryption(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Private key material or public key bytes are unusable.
    #[error("invalid key material: {0}")]
    KeyMaterial(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// I/O failures, unchanged.
    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for NodeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Encoding(msg) => NodeError::Encoding(msg),
            CoreError::Decryption(msg) => NodeError::Decryption(msg),
            CoreError::InvalidPublicKey(msg) => NodeError::MalformedEnvelope(msg),
            CoreError::InvalidPrivateKey(msg) | CoreError::Signing(msg) => {
                NodeError::KeyMaterial(msg)
            }
            CoreError::InvalidCid(msg) => NodeError::Encoding(msg),
        }
    }
}

impl From<StoreError> for NodeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => NodeError::NotFound(key),
            StoreError::InvalidKey(key) => NodeError::InvalidKey(key),
            StoreError::NotEmpty(path) => NodeError::NotEmpty(path),
            StoreError::MalformedEnvelope(msg) => NodeError::MalformedEnvelope(msg),
            StoreError::Serialization(msg) => NodeError::Encoding(msg),
            StoreError::Core(err) => err.into(),
            StoreError::Io(err) => NodeError::Filesystem(err),
        }
    }
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
