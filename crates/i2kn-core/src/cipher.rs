//! Symmetric encryption of record plaintext.
//!
//! The key and base IV both come from the node's marshalled private key, so
//! only the node that wrote an envelope can read it back. AES-256 in counter
//! mode, no authentication tag: integrity is checked by signature and CID.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 16;

/// Key and IV derived from private-key material.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    key: [u8; KEY_LEN],
    iv: [u8; NONCE_LEN],
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// Split marshalled private-key bytes into key (first 32) and IV (next 16).
pub fn derive_key(material: &[u8]) -> Result<CipherKey> {
    if material.len() < KEY_LEN + NONCE_LEN {
        return Err(CoreError::InvalidPrivateKey(format!(
            "need at least {} bytes of key material, got {}",
            KEY_LEN + NONCE_LEN,
            material.len()
        )));
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; NONCE_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + NONCE_LEN]);
    Ok(CipherKey { key, iv })
}

/// How the IV is chosen for each encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceStrategy {
    /// Reuse the derived IV for every message. Only for reading and writing
    /// envelopes compatible with older nodes.
    Static,
    /// Fresh random IV per message, stored next to the ciphertext.
    #[default]
    Random,
}

/// A per-message IV.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_LEN]);

impl Nonce {
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; NONCE_LEN] = bytes.try_into().map_err(|_| {
            CoreError::Decryption(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(self.0))
    }
}

/// Output of [`Cipher::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    /// Present only under [`NonceStrategy::Random`].
    pub nonce: Option<Nonce>,
}

/// AES-256-CTR bound to one node's key.
#[derive(Clone)]
pub struct Cipher {
    key: CipherKey,
    strategy: NonceStrategy,
}

impl Cipher {
    pub fn new(key: CipherKey, strategy: NonceStrategy) -> Self {
        Self { key, strategy }
    }

    pub fn strategy(&self) -> NonceStrategy {
        self.strategy
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Sealed {
        let nonce = match self.strategy {
            NonceStrategy::Static => None,
            NonceStrategy::Random => Some(Nonce::random()),
        };
        let iv = nonce.map_or(self.key.iv, |n| n.0);

        let mut ciphertext = plaintext.to_vec();
        self.apply(&iv, &mut ciphertext);
        Sealed { ciphertext, nonce }
    }

    /// Decrypt with the envelope's nonce if it has one, else the derived IV.
    ///
    /// Fails only on structurally malformed input. A ciphertext written
    /// under another key decrypts to garbage.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: Option<&Nonce>) -> Result<Vec<u8>> {
        if ciphertext.is_empty() {
            return Err(CoreError::Decryption("empty ciphertext".into()));
        }
        let iv = nonce.map_or(self.key.iv, |n| n.0);

        let mut plaintext = ciphertext.to_vec();
        self.apply(&iv, &mut plaintext);
        Ok(plaintext)
    }

    fn apply(&self, iv: &[u8; NONCE_LEN], buf: &mut [u8]) {
        let mut stream = Aes256Ctr::new(&self.key.key.into(), &(*iv).into());
        stream.apply_keystream(buf);
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(fill: u8) -> Vec<u8> {
        (0..68u8).map(|i| i.wrapping_add(fill)).collect()
    }

    fn cipher(fill: u8, strategy: NonceStrategy) -> Cipher {
        Cipher::new(derive_key(&material(fill)).unwrap(), strategy)
    }

    #[test]
    fn test_derive_key_requires_48_bytes() {
        assert!(derive_key(&[0u8; 48]).is_ok());
        assert!(matches!(
            derive_key(&[0u8; 47]),
            Err(CoreError::InvalidPrivateKey(_))
        ));
        assert!(derive_key(&[]).is_err());
    }

    #[test]
    fn test_derive_key_splits_material() {
        let key = derive_key(&material(0)).unwrap();
        assert_eq!(&key.key[..], &material(0)[..32]);
        assert_eq!(&key.iv[..], &material(0)[32..48]);
    }

    #[test]
    fn test_static_roundtrip() {
        let c = cipher(0, NonceStrategy::Static);
        let sealed = c.encrypt(b"hello world");
        assert!(sealed.nonce.is_none());
        assert_ne!(sealed.ciphertext, b"hello world");
        assert_eq!(c.decrypt(&sealed.ciphertext, None).unwrap(), b"hello world");
    }

    #[test]
    fn test_static_is_deterministic() {
        let c = cipher(0, NonceStrategy::Static);
        assert_eq!(c.encrypt(b"same").ciphertext, c.encrypt(b"same").ciphertext);
    }

    #[test]
    fn test_random_roundtrip() {
        let c = cipher(0, NonceStrategy::Random);
        let sealed = c.encrypt(b"hello world");
        let nonce = sealed.nonce.expect("random strategy yields a nonce");
        assert_eq!(
            c.decrypt(&sealed.ciphertext, Some(&nonce)).unwrap(),
            b"hello world"
        );
    }

    #[test]
    fn test_random_ciphertexts_differ() {
        let c = cipher(0, NonceStrategy::Random);
        let a = c.encrypt(b"same plaintext");
        let b = c.encrypt(b"same plaintext");
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_static_cipher_reads_random_envelope() {
        let writer = cipher(0, NonceStrategy::Random);
        let reader = cipher(0, NonceStrategy::Static);
        let sealed = writer.encrypt(b"payload");
        assert_eq!(
            reader.decrypt(&sealed.ciphertext, sealed.nonce.as_ref()).unwrap(),
            b"payload"
        );
    }

    #[test]
    fn test_wrong_key_yields_garbage() {
        let sealed = cipher(0, NonceStrategy::Static).encrypt(b"secret message");
        let garbage = cipher(1, NonceStrategy::Static)
            .decrypt(&sealed.ciphertext, None)
            .unwrap();
        assert_eq!(garbage.len(), b"secret message".len());
        assert_ne!(garbage, b"secret message");
    }

    #[test]
    fn test_empty_ciphertext_errors() {
        let c = cipher(0, NonceStrategy::Static);
        assert!(matches!(c.decrypt(&[], None), Err(CoreError::Decryption(_))));
    }

    #[test]
    fn test_nonce_length_checked() {
        assert!(Nonce::from_slice(&[0u8; 16]).is_ok());
        assert!(matches!(
            Nonce::from_slice(&[0u8; 12]),
            Err(CoreError::Decryption(_))
        ));
    }

    #[test]
    fn test_nonce_strategy_serde() {
        assert_eq!(NonceStrategy::default(), NonceStrategy::Random);
        assert_eq!(
            serde_json::to_string(&NonceStrategy::Static).unwrap(),
            "\"static\""
        );
        let parsed: NonceStrategy = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(parsed, NonceStrategy::Random);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_key(&material(0)).unwrap();
        assert_eq!(format!("{:?}", key), "CipherKey(..)");
    }
}
