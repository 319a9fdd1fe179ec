//! The on-disk envelope wrapping one encrypted record.
//!
//! ```json
//! {"item":"<b64 ciphertext>","byPubkey":"<b64 key>","cidPrev":"<cid>","sig":"<b64>","nonce":"<b64 iv>"}
//! ```
//!
//! `cidPrev` and `nonce` are omitted when absent. Readers also accept
//! `"cidPrev": null`. Binary fields stay base64 text here and are decoded on
//! access, so each field can fail the way its consumer expects.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use i2kn_core::{CoreError, Nonce, PublicKey, Sealed, Signature};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "item")]
    ciphertext: String,

    #[serde(rename = "byPubkey")]
    sender_public_key: String,

    #[serde(rename = "cidPrev", default, skip_serializing_if = "Option::is_none")]
    previous_cid: Option<String>,

    #[serde(rename = "sig")]
    signature: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
}

impl Envelope {
    pub fn new(
        sealed: &Sealed,
        sender: &PublicKey,
        previous_cid: Option<String>,
        signature: &Signature,
    ) -> Self {
        Self {
            ciphertext: STANDARD.encode(&sealed.ciphertext),
            sender_public_key: STANDARD.encode(sender.to_protobuf()),
            previous_cid,
            signature: STANDARD.encode(signature.as_bytes()),
            nonce: sealed.nonce.map(|n| STANDARD.encode(n.as_bytes())),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::MalformedEnvelope(e.to_string()))
    }

    /// Ciphertext bytes. Undecodable base64 is a decryption failure.
    pub fn ciphertext(&self) -> i2kn_core::Result<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| CoreError::Decryption(format!("ciphertext: {}", e)))
    }

    /// The per-message IV, if the writer used one.
    pub fn nonce(&self) -> i2kn_core::Result<Option<Nonce>> {
        self.nonce
            .as_deref()
            .map(|text| {
                let bytes = STANDARD
                    .decode(text)
                    .map_err(|e| CoreError::Decryption(format!("nonce: {}", e)))?;
                Nonce::from_slice(&bytes)
            })
            .transpose()
    }

    /// Marshalled public key of the writer.
    pub fn sender_public_key(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.sender_public_key)
            .map_err(|e| StoreError::MalformedEnvelope(format!("byPubkey: {}", e)))
    }

    /// Raw signature bytes, or `None` if the field is not base64.
    ///
    /// A missing signature only makes the record unverifiable.
    pub fn signature(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.signature).ok()
    }

    pub fn previous_cid(&self) -> Option<&str> {
        self.previous_cid.as_deref()
    }
}
