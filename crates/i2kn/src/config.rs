//! Node configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! base_dir = "/var/lib/i2kn"
//! dir_prefix = ".i2KnV3-"
//! codec = "json"            # or "dag-cbor"
//! nonce_strategy = "random" # or "static"
//! bootstrap_collections = ["companies.db", "bases.db", "pages.db", "users.db"]
//! ```

use std::path::{Path, PathBuf};

use i2kn_core::{Codec, NonceStrategy, PeerId};
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};

pub const DEFAULT_DIR_PREFIX: &str = ".i2KnV3-";

/// Contents written to each bootstrap collection.
pub const EMPTY_COLLECTION: &[u8] = b"[]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Directory holding the node's storage root.
    pub base_dir: PathBuf,
    /// Prepended to the peer id to name the storage root.
    pub dir_prefix: String,
    /// Codec used for CIDs of new records.
    pub codec: Codec,
    pub nonce_strategy: NonceStrategy,
    /// Files created empty by `create_repo`.
    pub bootstrap_collections: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            dir_prefix: DEFAULT_DIR_PREFIX.to_string(),
            codec: Codec::default(),
            nonce_strategy: NonceStrategy::default(),
            bootstrap_collections: ["companies.db", "bases.db", "pages.db", "users.db"]
                .map(String::from)
                .to_vec(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl NodeConfig {
    /// Config rooted at `base_dir`, everything else default.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dir_prefix.contains(['/', '\\']) {
            return Err(NodeError::Config(format!(
                "dir_prefix must not contain path separators: {:?}",
                self.dir_prefix
            )));
        }
        for name in &self.bootstrap_collections {
            i2kn_store::validate_key(name)
                .map_err(|_| NodeError::Config(format!("invalid bootstrap collection {:?}", name)))?;
        }
        Ok(())
    }

    /// Storage root of the node with this peer id.
    pub fn repo_dir(&self, peer_id: &PeerId) -> PathBuf {
        self.base_dir.join(format!("{}{}", self.dir_prefix, peer_id))
    }
}
