//! Cryptographic primitives: node keys, signatures and SHA-256 hashing.
//!
//! Keys travel in the libp2p protobuf encoding so that envelopes written by
//! other nodes of the network can be read back. Ed25519 and RSA keys are
//! accepted; keys created here are always Ed25519:
//!
//! ```text
//! public  = 08 01 12 20 || ed25519_public(32)
//! private = 08 01 12 40 || ed25519_seed(32) || ed25519_public(32)
//! rsa     = 08 00 12 <len> || pkcs1 / x509 DER
//! ```

use base64::{engine::general_purpose::STANDARD, Engine};
use libp2p_identity::{Keypair, PeerId};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{CoreError, Result};

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A signer's public key.
#[derive(Clone)]
pub struct PublicKey(libp2p_identity::PublicKey);

impl PublicKey {
    /// Decode from the libp2p protobuf form.
    pub fn from_protobuf(bytes: &[u8]) -> Result<Self> {
        libp2p_identity::PublicKey::try_decode_protobuf(bytes)
            .map(Self)
            .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))
    }

    /// Encode in the libp2p protobuf form.
    pub fn to_protobuf(&self) -> Vec<u8> {
        self.0.encode_protobuf()
    }

    /// Hex of the protobuf form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_protobuf())
    }

    /// The peer id this key resolves to.
    pub fn to_peer_id(&self) -> PeerId {
        self.0.to_peer_id()
    }

    /// Verify a signature over a message.
    ///
    /// Returns `false` for a malformed signature as well as for a
    /// signature that does not match.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.0.verify(message, signature)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_protobuf() == other.to_protobuf()
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_peer_id())
    }
}

impl From<libp2p_identity::PublicKey> for PublicKey {
    fn from(key: libp2p_identity::PublicKey) -> Self {
        Self(key)
    }
}

/// A detached signature. 64 bytes for Ed25519, the modulus size for RSA.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "Sig({}...)", &hex[..hex.len().min(8)])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The node's private key.
///
/// A key decoded from material keeps those exact bytes: the cipher key is
/// cut from them, and RSA keys cannot be re-encoded.
#[derive(Clone)]
pub struct NodeKey {
    keypair: Keypair,
    encoded: Option<Zeroizing<Vec<u8>>>,
}

impl NodeKey {
    /// Generate a new random Ed25519 key.
    ///
    /// Production nodes receive their key from outside; this is for tests and tooling.
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::generate_ed25519(),
            encoded: None,
        }
    }

    /// Create an Ed25519 key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        let mut secret = Zeroizing::new(*seed);
        let keypair = Keypair::ed25519_from_bytes(&mut *secret)
            .map_err(|e| CoreError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self {
            keypair,
            encoded: None,
        })
    }

    /// Decode a libp2p protobuf-marshalled private key (Ed25519 or RSA).
    ///
    /// For Ed25519 the embedded public half must match the seed.
    pub fn from_protobuf(bytes: &[u8]) -> Result<Self> {
        let keypair = Keypair::from_protobuf_encoding(bytes)
            .map_err(|e| CoreError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self {
            keypair,
            encoded: Some(Zeroizing::new(bytes.to_vec())),
        })
    }

    /// Decode base64 (padded) key material as handed to node initialization.
    pub fn from_base64(material: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(material.trim())
                .map_err(|e| CoreError::InvalidPrivateKey(e.to_string()))?,
        );
        Self::from_protobuf(&bytes)
    }

    /// The libp2p protobuf form.
    pub fn to_protobuf(&self) -> Result<Zeroizing<Vec<u8>>> {
        match &self.encoded {
            Some(bytes) => Ok(bytes.clone()),
            None => self
                .keypair
                .to_protobuf_encoding()
                .map(Zeroizing::new)
                .map_err(|e| CoreError::InvalidPrivateKey(e.to_string())),
        }
    }

    /// Encode as base64 (padded) key material.
    pub fn to_base64(&self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(STANDARD.encode(self.to_protobuf()?.as_slice())))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.keypair.public())
    }

    pub fn peer_id(&self) -> PeerId {
        self.keypair.public().to_peer_id()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.keypair
            .sign(message)
            .map(Signature)
            .map_err(|e| CoreError::Signing(e.to_string()))
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({})", self.peer_id())
    }
}
