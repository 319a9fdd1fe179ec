//! Run-once facade over a filesystem node.
//!
//! Collaborators that cannot carry a [`Node`] around hold one `Files` and
//! call `init` once with the node's private key. Every other call before
//! that fails with [`NodeError::Uninitialized`].

use std::sync::OnceLock;

use bytes::Bytes;
use i2kn_core::{Cid, NodeKey, PeerId};
use i2kn_store::FsStore;

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::node::{LoadResult, Node};

#[derive(Debug, Default)]
pub struct Files {
    config: NodeConfig,
    node: OnceLock<Node<FsStore>>,
}

impl Files {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            node: OnceLock::new(),
        }
    }

    /// Bind the facade to a node identity.
    ///
    /// `private_key_material` is the base64 libp2p-marshalled Ed25519 or RSA key.
    /// Only the first successful call wins.
    pub fn init(&self, private_key_material: &str) -> Result<PeerId> {
        self.init_with_key(NodeKey::from_base64(private_key_material)?)
    }

    pub fn init_with_key(&self, key: NodeKey) -> Result<PeerId> {
        if self.node.get().is_some() {
            return Err(NodeError::AlreadyInitialized);
        }
        let node = Node::open(key, self.config.clone())?;
        let peer_id = node.peer_id();
        self.node
            .set(node)
            .map_err(|_| NodeError::AlreadyInitialized)?;
        Ok(peer_id)
    }

    pub fn is_initialized(&self) -> bool {
        self.node.get().is_some()
    }

    /// The underlying node.
    pub fn node(&self) -> Result<&Node<FsStore>> {
        self.node.get().ok_or(NodeError::Uninitialized)
    }

    pub async fn create_repo(&self) -> Result<bool> {
        self.node()?.create_repo().await
    }

    pub async fn save(&self, record_json: &str, previous_cid: Option<&Cid>) -> Result<Cid> {
        self.node()?.save(record_json, previous_cid).await
    }

    pub async fn load(&self, cid: &str) -> Result<LoadResult> {
        self.node()?.load(cid).await
    }

    pub async fn history(&self, head: &str) -> Result<Vec<LoadResult>> {
        self.node()?.history(head).await
    }

    pub async fn save_clear(&self, name: &str, content: &[u8]) -> Result<()> {
        self.node()?.save_clear(name, content).await
    }

    pub async fn load_clear(&self, name: &str) -> Result<Bytes> {
        self.node()?.load_clear(name).await
    }

    pub async fn erase_dir(&self) -> Result<()> {
        self.node()?.erase_dir().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_calls_before_init_fail() {
        let dir = TempDir::new().unwrap();
        let files = Files::new(NodeConfig::with_base_dir(dir.path()));

        assert!(!files.is_initialized());
        assert!(matches!(files.create_repo().await, Err(NodeError::Uninitialized)));
        assert!(matches!(files.save("{}", None).await, Err(NodeError::Uninitialized)));
        assert!(matches!(files.load("x").await, Err(NodeError::Uninitialized)));
        assert!(matches!(files.save_clear("a", b"").await, Err(NodeError::Uninitialized)));
        assert!(matches!(files.load_clear("a").await, Err(NodeError::Uninitialized)));
        assert!(matches!(files.erase_dir().await, Err(NodeError::Uninitialized)));
    }

    #[test]
    fn test_second_init_fails() {
        let dir = TempDir::new().unwrap();
        let files = Files::new(NodeConfig::with_base_dir(dir.path()));
        let material = NodeKey::from_seed(&[1u8; 32]).unwrap().to_base64().unwrap();

        let peer = files.init(&material).unwrap();
        assert_eq!(files.node().unwrap().peer_id(), peer);
        assert!(matches!(
            files.init(&material),
            Err(NodeError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_bad_material_leaves_uninitialized() {
        let files = Files::default();
        assert!(matches!(files.init("!!"), Err(NodeError::KeyMaterial(_))));
        assert!(!files.is_initialized());
    }

    #[test]
    fn test_escaping_prefix_leaves_uninitialized() {
        let dir = TempDir::new().unwrap();
        let files = Files::new(NodeConfig {
            dir_prefix: "../x".into(),
            ..NodeConfig::with_base_dir(dir.path())
        });
        let key = NodeKey::from_seed(&[1u8; 32]).unwrap();
        assert!(matches!(files.init_with_key(key), Err(NodeError::Config(_))));
        assert!(!files.is_initialized());
    }

    #[test]
    fn test_racing_inits_have_one_winner() {
        let dir = TempDir::new().unwrap();
        let files = Arc::new(Files::new(NodeConfig::with_base_dir(dir.path())));

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let files = Arc::clone(&files);
                std::thread::spawn(move || files.init_with_key(NodeKey::from_seed(&[i; 32]).unwrap()).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
    }
}
