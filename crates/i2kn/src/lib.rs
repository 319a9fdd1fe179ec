//! # i2kn
//!
//! Persistence and integrity for i2kn knowledge-sharing nodes: records are
//! addressed by CID, encrypted under the node's key, signed, and checked
//! again on every load.
//!
//! ## Overview
//!
//! - **Records**: JSON objects whose `id`, `name` and `content` fix their CID
//! - **Envelopes**: Encrypted, signed, immutable; stored under the CID
//! - **Chains**: A new version links to the previous one via `cidPrev`
//! - **Clear files**: Unencrypted blobs next to the envelopes
//!
//! ## Key Concepts
//!
//! - **Trust on recompute**: signer identity, signature and CID are derived
//!   from the envelope on each load, never stored.
//! - **Integrity is data**: failed checks come back as `false` flags in
//!   [`LoadResult`], not as errors.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use i2kn::{Node, NodeConfig};
//! use i2kn::core::NodeKey;
//!
//! async fn example(material: &str) -> i2kn::Result<()> {
//!     let node = Node::from_base64(material, NodeConfig::default())?;
//!     node.create_repo().await?;
//!
//!     let cid = node
//!         .save(r#"{"id":1,"name":"a","content":"hello"}"#, None)
//!         .await?;
//!     let loaded = node.load(&cid.to_string()).await?;
//!     assert!(loaded.signature_valid && loaded.cid_valid);
//!
//!     let _ = NodeKey::generate();
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `i2kn::core` - Encoding, CIDs, cipher, keys and peer identity
//! - `i2kn::store` - Envelope format and storage backends

pub mod config;
pub mod error;
pub mod files;
pub mod node;

// Re-export component crates
pub use i2kn_core as core;
pub use i2kn_store as store;

pub use config::NodeConfig;
pub use error::{NodeError, Result};
pub use files::Files;
pub use node::{LoadResult, Node};

pub use i2kn_core::{Cid, Codec, NodeKey, NonceStrategy, PeerId, Record};
