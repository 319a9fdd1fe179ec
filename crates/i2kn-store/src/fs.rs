//! Filesystem implementation of the Store trait.
//!
//! One directory per node. Blobs are plain files named by their key; writes
//! go to a uniquely named temporary file `.{key}.{16 hex}.tmp` in the same
//! directory, are synced to disk, and are then renamed over the target
//! (`put`) or hard-linked to it (`put_new`, which never replaces a file).
//!
//! A crash between the write and the rename can leave a temporary file
//! behind. Readers never see it; [`Store::erase_root`] removes it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::traits::{validate_key, Store};

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`. Nothing is created until
    /// [`Store::create_root`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Write `data` to a fresh temporary file and sync it to disk.
    async fn write_temp(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        let tmp = self
            .root
            .join(format!(".{}.{:016x}.tmp", key, rand::thread_rng().gen::<u64>()));

        let written = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp)
                .await?;
            file.write_all(data).await?;
            file.sync_data().await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(tmp)
    }

    async fn write_atomic(&self, key: &str, data: &[u8]) -> Result<()> {
        let target = self.path_for(key)?;
        let tmp = self.write_temp(key, data).await?;

        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(key, bytes = data.len(), "blob written");
        Ok(())
    }

    /// Link a synced temporary file to the target; fails if the target exists.
    async fn write_once(&self, key: &str, data: &[u8]) -> Result<bool> {
        let target = self.path_for(key)?;
        let tmp = self.write_temp(key, data).await?;

        let linked = fs::hard_link(&tmp, &target).await;
        let _ = fs::remove_file(&tmp).await;
        match linked {
            Ok(()) => {
                debug!(key, bytes = data.len(), "blob written");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(key, "blob already present, kept");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether `name` is a temporary file left by [`FsStore::write_temp`].
fn is_temp_name(name: &str) -> bool {
    let Some(stem) = name.strip_prefix('.').and_then(|n| n.strip_suffix(".tmp")) else {
        return false;
    };
    match stem.rsplit_once('.') {
        Some((key, suffix)) => {
            !key.is_empty() && suffix.len() == 16 && suffix.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[async_trait]
impl Store for FsStore {
    async fn create_root(&self, bootstrap: &[(String, Bytes)]) -> Result<bool> {
        if fs::try_exists(&self.root).await? {
            return Ok(false);
        }

        fs::create_dir_all(&self.root).await?;
        for (name, data) in bootstrap {
            self.write_atomic(name, data).await?;
        }
        Ok(true)
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        self.write_atomic(key, data).await
    }

    async fn put_new(&self, key: &str, data: &[u8]) -> Result<bool> {
        self.write_once(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn has(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn erase_root(&self) -> Result<()> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut stale = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            match name.to_str() {
                Some(n) if is_temp_name(n) => stale.push(entry.path()),
                _ => return Err(StoreError::NotEmpty(self.root.display().to_string())),
            }
        }

        for path in &stale {
            warn!(path = %path.display(), "removing interrupted write");
            fs::remove_file(path).await?;
        }
        fs::remove_dir(&self.root).await?;
        Ok(())
    }
}
