//! # i2kn core
//!
//! Pure primitives for i2kn records: canonical encoding, content identifiers,
//! encryption, signatures, and peer identity.
//!
//! This crate contains no I/O and no storage. Everything here is deterministic
//! computation over keys and records, except random nonce generation.
//!
//! ## Key Types
//!
//! - [`Record`] - A JSON object with `id`, `name`, `content` semantic fields
//! - [`Cid`] - Self-describing content identifier (CIDv1, SHA-256)
//! - [`Cipher`] - AES-256-CTR bound to a node's private key
//! - [`NodeIdentity`] - Key, peer id and cipher derived at start-up
//! - [`PeerId`] - libp2p fingerprint of a public key (Ed25519 or RSA)
//!
//! ## Canonicalization
//!
//! Only the semantic fields of a record are hashed, encoded deterministically
//! as sorted JSON (default) or dag-cbor. See [`canonical`] module.

pub mod canonical;
pub mod cid;
pub mod cipher;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod record;

pub use canonical::{canonical_bytes, Codec};
pub use cid::{compute_cid, Cid};
pub use cipher::{derive_key, Cipher, CipherKey, Nonce, NonceStrategy, Sealed};
pub use crypto::{NodeKey, PublicKey, Sha256Hash, Signature};
pub use error::{CoreError, Result};
pub use identity::{identity_from_public_key, NodeIdentity, PeerId};
pub use record::{Record, CID_FIELD, SEMANTIC_FIELDS};
