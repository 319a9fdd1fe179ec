//! Error types for the i2kn core.

use thiserror::Error;

/// Errors that can occur while encoding, addressing, or sealing records.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The record cannot be canonically encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The ciphertext is structurally malformed.
    #[error("decryption error: {0}")]
    Decryption(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid cid: {0}")]
    InvalidCid(String),

    /// The key refused to sign.
    #[error("signing error: {0}")]
    Signing(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
