//! Content identifiers.
//!
//! A CID is self-describing:
//!
//! ```text
//! cid  = varint(1) || varint(codec) || varint(0x12) || varint(32) || sha256(canonical_bytes)
//! text = "b" || base32lower_nopad(cid)
//! ```
//!
//! With the dag-cbor codec the textual form starts with `bafyrei`;
//! with the default json codec it starts with `bagaaiera`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::canonical::{canonical_bytes, Codec};
use crate::crypto::Sha256Hash;
use crate::error::{CoreError, Result};
use crate::record::Record;

/// The only CID version produced.
pub const CID_VERSION: u64 = 1;

/// Multihash code for sha2-256.
pub const SHA2_256: u64 = 0x12;

/// Multibase prefix for base32 lower-case, unpadded.
pub const MULTIBASE_BASE32: char = 'b';

/// A version-1 content identifier over a SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cid {
    codec: Codec,
    digest: Sha256Hash,
}

impl Cid {
    pub const fn new(codec: Codec, digest: Sha256Hash) -> Self {
        Self { codec, digest }
    }

    pub const fn codec(&self) -> Codec {
        self.codec
    }

    pub const fn digest(&self) -> &Sha256Hash {
        &self.digest
    }

    /// Binary form (version, codec, multihash).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(37);
        write_varint(&mut buf, CID_VERSION);
        write_varint(&mut buf, self.codec.code());
        write_varint(&mut buf, SHA2_256);
        write_varint(&mut buf, 32);
        buf.extend_from_slice(self.digest.as_bytes());
        buf
    }

    /// Parse the binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;

        let version = read_varint(&mut cursor)?;
        if version != CID_VERSION {
            return Err(CoreError::InvalidCid(format!("unsupported version {}", version)));
        }

        let code = read_varint(&mut cursor)?;
        let codec = Codec::from_code(code)
            .ok_or_else(|| CoreError::InvalidCid(format!("unsupported codec 0x{:x}", code)))?;

        let hash_fn = read_varint(&mut cursor)?;
        if hash_fn != SHA2_256 {
            return Err(CoreError::InvalidCid(format!(
                "unsupported hash function 0x{:x}",
                hash_fn
            )));
        }

        let len = read_varint(&mut cursor)?;
        if len != 32 || cursor.len() != 32 {
            return Err(CoreError::InvalidCid("digest must be 32 bytes".into()));
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(cursor);
        Ok(Self::new(codec, Sha256Hash::from_bytes(digest)))
    }
}

/// Compute the CID of a record's semantic fields.
pub fn compute_cid(record: &Record, codec: Codec) -> Result<Cid> {
    let bytes = canonical_bytes(record, codec)?;
    Ok(Cid::new(codec, Sha256Hash::hash(&bytes)))
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MULTIBASE_BASE32, base32_encode(&self.to_bytes()))
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self)
    }
}

impl FromStr for Cid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(MULTIBASE_BASE32)
            .ok_or_else(|| CoreError::InvalidCid("expected base32 multibase prefix 'b'".into()))?;
        let bytes = base32_decode(rest)
            .ok_or_else(|| CoreError::InvalidCid("invalid base32".into()))?;
        Self::from_bytes(&bytes)
    }
}

impl TryFrom<String> for Cid {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Cid> for String {
    fn from(cid: Cid) -> Self {
        cid.to_string()
    }
}

fn write_varint(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push((n as u8 & 0x7f) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

fn read_varint(cursor: &mut &[u8]) -> Result<u64> {
    let mut value = 0u64;
    for (i, &byte) in cursor.iter().enumerate().take(9) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            *cursor = &cursor[i + 1..];
            return Ok(value);
        }
    }
    Err(CoreError::InvalidCid("truncated varint".into()))
}

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

// RFC 4648 Base32 encoding (lowercase, no padding)
fn base32_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in data {
        buffer = (buffer << 8) | (byte as u64);
        bits_in_buffer += 8;

        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let index = ((buffer >> bits_in_buffer) & 0x1f) as usize;
            result.push(BASE32_ALPHABET[index] as char);
        }
    }

    if bits_in_buffer > 0 {
        let index = ((buffer << (5 - bits_in_buffer)) & 0x1f) as usize;
        result.push(BASE32_ALPHABET[index] as char);
    }

    result
}

fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let mut result = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for c in text.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&a| a == c)? as u64;
        buffer = (buffer << 5) | value;
        bits_in_buffer += 5;

        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push((buffer >> bits_in_buffer) as u8);
        }
    }

    // Leftover bits are padding and must be zero.
    if bits_in_buffer >= 5 || buffer & ((1 << bits_in_buffer) - 1) != 0 {
        return None;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_prefixes() {
        let record = Record::new(1, "a", "hello");

        let cbor = compute_cid(&record, Codec::DagCbor).unwrap().to_string();
        assert!(cbor.starts_with("bafyrei"), "{}", cbor);
        assert_eq!(cbor, cbor.to_lowercase());

        let json = compute_cid(&record, Codec::Json).unwrap().to_string();
        assert!(json.starts_with("bagaaiera"), "{}", json);
        assert_ne!(cbor, json);
    }

    #[test]
    fn test_cid_digest_matches_canonical_bytes() {
        let record = Record::new(1, "a", "hello");
        let cid = compute_cid(&record, Codec::Json).unwrap();
        let expected = Sha256Hash::hash(br#"{"id":1,"name":"a","content":"hello"}"#);
        assert_eq!(cid.digest(), &expected);
        assert_eq!(cid.codec(), Codec::Json);
    }

    #[test]
    fn test_cid_string_roundtrip() {
        for codec in [Codec::DagCbor, Codec::Json] {
            let cid = compute_cid(&Record::new("k", "n", "c"), codec).unwrap();
            let parsed: Cid = cid.to_string().parse().unwrap();
            assert_eq!(parsed, cid);
        }
    }

    #[test]
    fn test_cid_serde_as_string() {
        let cid = compute_cid(&Record::new(1, "a", "b"), Codec::DagCbor).unwrap();
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, format!("\"{}\"", cid));
        let back: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);
    }

    #[test]
    fn test_cid_parse_rejects_garbage() {
        assert!("nonexistent-cid".parse::<Cid>().is_err());
        assert!("zQmFoo".parse::<Cid>().is_err());
        assert!("b".parse::<Cid>().is_err());
        assert!("bafyrei".parse::<Cid>().is_err());
        // Upper-case base32 is a different multibase.
        let cid = compute_cid(&Record::new(1, "a", "b"), Codec::DagCbor).unwrap();
        assert!(cid.to_string().to_uppercase().parse::<Cid>().is_err());
    }

    #[test]
    fn test_cid_from_bytes_rejects_unknown_tags() {
        let cid = compute_cid(&Record::new(1, "a", "b"), Codec::DagCbor).unwrap();
        let good = cid.to_bytes();

        let mut bad_version = good.clone();
        bad_version[0] = 0x02;
        assert!(Cid::from_bytes(&bad_version).is_err());

        let mut bad_codec = good.clone();
        bad_codec[1] = 0x55;
        assert!(Cid::from_bytes(&bad_codec).is_err());

        let mut bad_hash = good.clone();
        bad_hash[2] = 0x13;
        assert!(Cid::from_bytes(&bad_hash).is_err());

        assert!(Cid::from_bytes(&good[..good.len() - 1]).is_err());
    }

    #[test]
    fn test_varint() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 0x0200);
        assert_eq!(buf, vec![0x80, 0x04]);

        let mut cursor = &buf[..];
        assert_eq!(read_varint(&mut cursor).unwrap(), 0x0200);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_base32_encode() {
        // Test vectors from RFC 4648
        assert_eq!(base32_encode(b""), "");
        assert_eq!(base32_encode(b"f"), "my");
        assert_eq!(base32_encode(b"fo"), "mzxq");
        assert_eq!(base32_encode(b"foo"), "mzxw6");
        assert_eq!(base32_encode(b"foob"), "mzxw6yq");
        assert_eq!(base32_encode(b"fooba"), "mzxw6ytb");
        assert_eq!(base32_encode(b"foobar"), "mzxw6ytboi");
    }

    #[test]
    fn test_base32_decode() {
        for word in [&b""[..], b"f", b"fo", b"foo", b"foob", b"fooba", b"foobar"] {
            assert_eq!(base32_decode(&base32_encode(word)).unwrap(), word);
        }
        assert!(base32_decode("MY").is_none());
        assert!(base32_decode("m1").is_none());
        // Non-zero padding bits
        assert!(base32_decode("mz").is_none());
    }
}
