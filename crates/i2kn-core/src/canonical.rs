//! Canonical encoding of a record's semantic fields.
//!
//! Only `id`, `name` and `content` are encoded. Two codecs are supported:
//!
//! **json** (default), compact JSON:
//! - Top-level fields in fixed order `id`, `name`, `content`
//! - Nested object keys sorted lexicographically
//! - No insignificant whitespace
//! - Floats in shortest round-trip form
//!
//! **dag-cbor**, RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Floats always as float64 (`0xfb` + 8 bytes big-endian)
//! - Definite lengths only, no tags
//!
//! An integral float within the safe integer range (|n| <= 2^53 - 1) is the
//! same number as the integer and is encoded as one. NaN and infinities have
//! no encoding. A missing semantic field is left out of the encoding; `null`
//! is encoded as null.
//!
//! **CRITICAL**: These encodings are FROZEN. Changes alter every CID.

use ciborium::value::{Integer, Value as CborValue};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{CoreError, Result};
use crate::record::{Record, SEMANTIC_FIELDS};

/// Content-type tag of a CID: how the hashed bytes were encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Codec {
    /// Deterministic CBOR (multicodec `0x71`).
    #[serde(rename = "dag-cbor")]
    DagCbor,
    /// Compact canonical JSON (multicodec `0x0200`).
    #[default]
    #[serde(rename = "json")]
    Json,
}

/// Largest integer a float64 holds exactly, 2^53 - 1.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Codec {
    /// Multicodec code.
    pub const fn code(self) -> u64 {
        match self {
            Codec::DagCbor => 0x71,
            Codec::Json => 0x0200,
        }
    }

    /// Look up a codec by multicodec code.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0x71 => Some(Codec::DagCbor),
            0x0200 => Some(Codec::Json),
            _ => None,
        }
    }
}

/// Encode a record's semantic fields to canonical bytes.
pub fn canonical_bytes(record: &Record, codec: Codec) -> Result<Vec<u8>> {
    match codec {
        Codec::DagCbor => canonical_cbor(record),
        Codec::Json => canonical_json(record),
    }
}

fn semantic_fields(record: &Record) -> impl Iterator<Item = (&'static str, &Value)> {
    SEMANTIC_FIELDS
        .into_iter()
        .filter_map(move |key| record.fields().get(key).map(|v| (key, v)))
}

// ─────────────────────────────────────────────────────────────────────────────
// CBOR
// ─────────────────────────────────────────────────────────────────────────────

fn canonical_cbor(record: &Record) -> Result<Vec<u8>> {
    let entries = semantic_fields(record)
        .map(|(k, v)| Ok((CborValue::Text(k.to_string()), json_to_cbor(v)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut buf = Vec::new();
    encode_value(&mut buf, &CborValue::Map(entries))?;
    Ok(buf)
}

/// Convert a JSON value to the CBOR value model.
fn json_to_cbor(value: &Value) -> Result<CborValue> {
    Ok(match value {
        Value::Null => CborValue::Null,
        Value::Bool(b) => CborValue::Bool(*b),
        Value::Number(n) => number(n)?,
        Value::String(s) => CborValue::Text(s.clone()),
        Value::Array(arr) => CborValue::Array(arr.iter().map(json_to_cbor).collect::<Result<_>>()?),
        Value::Object(map) => CborValue::Map(
            map.iter()
                .map(|(k, v)| Ok((CborValue::Text(k.clone()), json_to_cbor(v)?)))
                .collect::<Result<_>>()?,
        ),
    })
}

/// Canonical form of a JSON number: an integer or a finite float64.
fn number(n: &Number) -> Result<CborValue> {
    if let Some(i) = n.as_i64() {
        return Ok(CborValue::Integer(i.into()));
    }
    if let Some(u) = n.as_u64() {
        return Ok(CborValue::Integer(u.into()));
    }
    match n.as_f64() {
        Some(f) if !f.is_finite() => Err(CoreError::Encoding(format!(
            "number {} has no canonical encoding",
            f
        ))),
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            Ok(CborValue::Integer((f as i64).into()))
        }
        Some(f) => Ok(CborValue::Float(f)),
        None => Err(CoreError::Encoding(format!("unrepresentable number {}", n))),
    }
}

/// Recursively encode a CBOR value.
fn encode_value(buf: &mut Vec<u8>, value: &CborValue) -> Result<()> {
    match value {
        CborValue::Integer(i) => encode_integer(buf, *i),
        CborValue::Bytes(b) => encode_bytes(buf, b),
        CborValue::Text(s) => encode_text(buf, s),
        CborValue::Array(arr) => encode_array(buf, arr)?,
        CborValue::Map(entries) => encode_map(buf, entries)?,
        CborValue::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        CborValue::Null => buf.push(0xf6),
        CborValue::Float(f) => encode_float(buf, *f)?,
        _ => return Err(CoreError::Encoding("unsupported CBOR value type".into())),
    }
    Ok(())
}

fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_float(buf: &mut Vec<u8>, f: f64) -> Result<()> {
    if !f.is_finite() {
        return Err(CoreError::Encoding(format!("number {} has no canonical encoding", f)));
    }
    buf.push(0xfb);
    buf.extend_from_slice(&f.to_bits().to_be_bytes());
    Ok(())
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[CborValue]) -> Result<()> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item)?;
    }
    Ok(())
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map(buf: &mut Vec<u8>, entries: &[(CborValue, CborValue)]) -> Result<()> {
    let mut pairs = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value(&mut key_buf, k)?;
            Ok((key_buf, v))
        })
        .collect::<Result<Vec<_>>>()?;

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, value)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON
// ─────────────────────────────────────────────────────────────────────────────

fn canonical_json(record: &Record) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.push(b'{');
    for (i, (key, value)) in semantic_fields(record).enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        write_json_string(&mut buf, key)?;
        buf.push(b':');
        write_json(&mut buf, value)?;
    }
    buf.push(b'}');
    Ok(buf)
}

fn write_json(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => match number(n)? {
            CborValue::Integer(i) => {
                let i: i128 = i.into();
                buf.extend_from_slice(i.to_string().as_bytes());
            }
            CborValue::Float(f) => {
                // serde_json prints finite floats in shortest round-trip form
                let n = Number::from_f64(f)
                    .ok_or_else(|| CoreError::Encoding(format!("number {} has no canonical encoding", f)))?;
                buf.extend_from_slice(n.to_string().as_bytes());
            }
            _ => return Err(CoreError::Encoding(format!("unsupported number {}", n))),
        },
        Value::String(s) => write_json_string(buf, s)?,
        Value::Array(arr) => {
            buf.push(b'[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_json(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            buf.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_json_string(buf, key)?;
                buf.push(b':');
                write_json(buf, &map[key.as_str()])?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

fn write_json_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    serde_json::to_writer(&mut *buf, s).map_err(|e| CoreError::Encoding(e.to_string()))
}
