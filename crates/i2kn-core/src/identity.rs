//! Peer identity.
//!
//! A peer id is the multihash of the marshalled public key, written in
//! base58btc. Ed25519 keys are short enough to be inlined under the identity
//! multihash, so their ids start with `12D3KooW`. RSA keys are hashed with
//! SHA-256 and give `Qm` ids.

pub use libp2p_identity::PeerId;

use crate::cipher::{derive_key, Cipher, NonceStrategy};
use crate::crypto::{NodeKey, PublicKey, Signature};
use crate::error::Result;

/// Resolve a marshalled public key to the peer id it belongs to.
///
/// Fails on bytes that are not a marshalled Ed25519 or RSA key.
pub fn identity_from_public_key(marshalled: &[u8]) -> Result<PeerId> {
    Ok(PublicKey::from_protobuf(marshalled)?.to_peer_id())
}

/// Everything a node derives from its private key at start-up.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    key: NodeKey,
    peer_id: PeerId,
    cipher: Cipher,
}

impl NodeIdentity {
    pub fn new(key: NodeKey, strategy: NonceStrategy) -> Result<Self> {
        let peer_id = key.peer_id();
        let cipher = Cipher::new(derive_key(&key.to_protobuf()?)?, strategy);
        Ok(Self {
            key,
            peer_id,
            cipher,
        })
    }

    /// Build from base64 marshalled private-key material.
    pub fn from_base64(material: &str, strategy: NonceStrategy) -> Result<Self> {
        Self::new(NodeKey::from_base64(material)?, strategy)
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.key.sign(message)
    }

    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }
}
