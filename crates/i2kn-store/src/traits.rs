//! Store trait: the abstract interface for a node's storage root.
//!
//! A root is a flat namespace of named blobs. Encrypted envelopes are stored
//! under their CID, clear files under caller-chosen names. Implementations
//! include the filesystem (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use i2kn_core::Cid;

use crate::envelope::Envelope;
use crate::error::{Result, StoreError};

/// The Store trait: async interface over one storage root.
///
/// # Design Notes
///
/// - **Flat keys**: every key is a single path component, see [`validate_key`].
/// - **Atomic puts**: a reader sees either the old blob or the new one.
/// - **Write-once envelopes**: [`Store::put_new`] never replaces a blob.
/// - **No recursive delete**: [`Store::erase_root`] refuses a non-empty root.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create the root if it does not exist and seed it with `bootstrap`.
    ///
    /// Returns `false` and writes nothing when the root already exists.
    async fn create_root(&self, bootstrap: &[(String, Bytes)]) -> Result<bool>;

    /// Write a blob, replacing any previous one.
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Write a blob only if `key` is free.
    ///
    /// Returns `false` and leaves the existing blob untouched otherwise.
    async fn put_new(&self, key: &str, data: &[u8]) -> Result<bool>;

    /// Read a blob. `NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Check whether a blob exists.
    async fn has(&self, key: &str) -> Result<bool>;

    /// Remove the root itself. `NotEmpty` if it still has entries.
    async fn erase_root(&self) -> Result<()>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn create_root(&self, bootstrap: &[(String, Bytes)]) -> Result<bool> {
        (**self).create_root(bootstrap).await
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        (**self).put(key, data).await
    }

    async fn put_new(&self, key: &str, data: &[u8]) -> Result<bool> {
        (**self).put_new(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        (**self).get(key).await
    }

    async fn has(&self, key: &str) -> Result<bool> {
        (**self).has(key).await
    }

    async fn erase_root(&self) -> Result<()> {
        (**self).erase_root().await
    }
}

/// Extension trait for envelope persistence.
pub trait StoreExt: Store {
    /// Serialize and store an envelope under its CID.
    ///
    /// Envelopes are immutable: returns `false` if one is already stored
    /// under `cid`, which is kept as is.
    fn put_envelope(
        &self,
        cid: &Cid,
        envelope: &Envelope,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Read and parse the envelope stored under `key`.
    fn get_envelope(&self, key: &str) -> impl std::future::Future<Output = Result<Envelope>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn put_envelope(&self, cid: &Cid, envelope: &Envelope) -> Result<bool> {
        let bytes = envelope.to_bytes()?;
        self.put_new(&cid.to_string(), &bytes).await
    }

    async fn get_envelope(&self, key: &str) -> Result<Envelope> {
        let bytes = self.get(key).await?;
        Envelope::from_bytes(&bytes)
    }
}

/// Reject keys that are not a single, ordinary path component.
pub fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
