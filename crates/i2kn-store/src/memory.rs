//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as the
//! filesystem store but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::io;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Result, StoreError};
use crate::traits::{validate_key, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// `None` stands for a root that has not been created.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Option<BTreeMap<String, Bytes>>>,
}

impl MemoryStore {
    /// Create a store whose root does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs under the root.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a blob in place, bypassing validation. For tamper tests.
    pub fn corrupt(&self, key: &str, data: Bytes) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(blobs) = inner.as_mut() {
            blobs.insert(key.to_string(), data);
        }
    }
}

fn missing_root() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::NotFound, "root does not exist"))
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_root(&self, bootstrap: &[(String, Bytes)]) -> Result<bool> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.is_some() {
            return Ok(false);
        }

        let mut blobs = BTreeMap::new();
        for (name, data) in bootstrap {
            validate_key(name)?;
            blobs.insert(name.clone(), data.clone());
        }
        *inner = Some(blobs);
        Ok(true)
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let blobs = inner.as_mut().ok_or_else(missing_root)?;
        blobs.insert(key.to_string(), Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn put_new(&self, key: &str, data: &[u8]) -> Result<bool> {
        validate_key(key)?;
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let blobs = inner.as_mut().ok_or_else(missing_root)?;
        if blobs.contains_key(key) {
            return Ok(false);
        }
        blobs.insert(key.to_string(), Bytes::copy_from_slice(data));
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        validate_key(key)?;
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .as_ref()
            .and_then(|blobs| blobs.get(key).cloned())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn has(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.as_ref().is_some_and(|blobs| blobs.contains_key(key)))
    }

    async fn erase_root(&self) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match inner.as_ref() {
            None => Err(missing_root()),
            Some(blobs) if !blobs.is_empty() => {
                Err(StoreError::NotEmpty("memory root".to_string()))
            }
            Some(_) => {
                *inner = None;
                Ok(())
            }
        }
    }
}
