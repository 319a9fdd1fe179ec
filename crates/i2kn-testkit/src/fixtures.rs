//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Once;

use i2kn::{Node, NodeConfig};
use i2kn_core::{NodeKey, NonceStrategy};
use i2kn_store::{FsStore, MemoryStore};
use serde_json::json;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// A filesystem node living in its own temporary base directory.
///
/// The directory is removed when the fixture is dropped.
pub struct TestNode {
    pub node: Node<FsStore>,
    pub key: NodeKey,
    dir: TempDir,
}

impl TestNode {
    /// Create a node with a random key.
    pub fn new() -> Self {
        Self::with_key(NodeKey::generate(), NonceStrategy::default())
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_key(NodeKey::from_seed(&seed).expect("seeded key"), NonceStrategy::default())
    }

    pub fn with_key(key: NodeKey, nonce_strategy: NonceStrategy) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let config = NodeConfig {
            nonce_strategy,
            ..NodeConfig::with_base_dir(dir.path())
        };
        Self::with_config(key, config, dir)
    }

    /// Use a custom config. `base_dir` is overridden with `dir`.
    pub fn with_config(key: NodeKey, config: NodeConfig, dir: TempDir) -> Self {
        let config = NodeConfig {
            base_dir: dir.path().to_path_buf(),
            ..config
        };
        let node = Node::open(key.clone(), config).expect("open node");
        Self { node, key, dir }
    }

    /// The temporary base directory (parent of the repo dir).
    pub fn base_dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Base64 key material as handed to `Files::init`.
    pub fn key_material(&self) -> String {
        self.key.to_base64().expect("encode key").to_string()
    }
}

impl Default for TestNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A node over a fresh in-memory store whose root already exists.
pub async fn memory_node(seed: [u8; 32]) -> Node<MemoryStore> {
    let node = Node::new(
        NodeKey::from_seed(&seed).expect("seeded key"),
        MemoryStore::new(),
        NodeConfig::with_base_dir("/nonexistent"),
    )
    .expect("create node");
    node.create_repo().await.expect("create repo");
    node
}

/// Create multiple filesystem nodes for multi-party tests.
pub fn multi_party_nodes(count: usize) -> Vec<TestNode> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestNode::with_seed(seed)
        })
        .collect()
}

/// A small record as JSON text.
pub fn sample_record(id: u64) -> String {
    json!({
        "id": id,
        "name": format!("record {}", id),
        "content": { "body": "lorem ipsum", "tags": ["test"] },
    })
    .to_string()
}

/// Install a `tracing` subscriber for tests, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
