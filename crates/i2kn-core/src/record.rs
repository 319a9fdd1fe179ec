//! Record: the logical unit a node persists.
//!
//! A record is a JSON object. Three fields form its semantic identity:
//! - `id`: caller-chosen identifier (integer or string, usually)
//! - `name`: human-readable title
//! - `content`: the body, any JSON value without floats
//!
//! Once addressed, the record also carries its own `cid`. Any other fields
//! ride along in the plaintext but never influence the CID.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::canonical::Codec;
use crate::cid::{compute_cid, Cid};
use crate::error::{CoreError, Result};

/// The fields hashed into a record's CID, in canonical JSON order.
pub const SEMANTIC_FIELDS: [&str; 3] = ["id", "name", "content"];

/// The field a computed CID is stored under.
pub const CID_FIELD: &str = "cid";

/// A parsed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from its three semantic fields.
    pub fn new(id: impl Into<Value>, name: impl Into<Value>, content: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".into(), id.into());
        fields.insert("name".into(), name.into());
        fields.insert("content".into(), content.into());
        Self { fields }
    }

    /// Parse a record from a JSON string.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| CoreError::Encoding(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a record from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| CoreError::Encoding(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wrap a JSON value; it must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CoreError::Encoding(format!(
                "record must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn id(&self) -> Option<&Value> {
        self.fields.get("id")
    }

    pub fn name(&self) -> Option<&Value> {
        self.fields.get("name")
    }

    pub fn content(&self) -> Option<&Value> {
        self.fields.get("content")
    }

    /// The embedded CID string, if the record has been addressed.
    pub fn cid(&self) -> Option<&str> {
        self.fields.get(CID_FIELD).and_then(Value::as_str)
    }

    /// All fields, including non-semantic ones.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Compute this record's CID.
    pub fn compute_cid(&self, codec: Codec) -> Result<Cid> {
        compute_cid(self, codec)
    }

    /// Compute the CID and embed it, replacing any stale `cid` field.
    pub fn address(mut self, codec: Codec) -> Result<(Cid, Self)> {
        let cid = self.compute_cid(codec)?;
        self.fields
            .insert(CID_FIELD.to_string(), Value::String(cid.to_string()));
        Ok((cid, self))
    }

    /// Serialize to the plaintext form that is encrypted and signed.
    ///
    /// Keys are emitted in sorted order, so equal records serialize identically.
    pub fn to_plaintext(&self) -> Result<Vec<u8>> {
        let sorted: BTreeMap<&String, &Value> = self.fields.iter().collect();
        serde_json::to_vec(&sorted).map_err(|e| CoreError::Encoding(e.to_string()))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object() {
        let record = Record::parse(r#"{"id":1,"name":"a","content":"hello"}"#).unwrap();
        assert_eq!(record.id(), Some(&json!(1)));
        assert_eq!(record.name(), Some(&json!("a")));
        assert_eq!(record.content(), Some(&json!("hello")));
        assert_eq!(record.cid(), None);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(Record::parse("[1,2,3]"), Err(CoreError::Encoding(_))));
        assert!(matches!(Record::parse("\"text\""), Err(CoreError::Encoding(_))));
        assert!(matches!(Record::parse("{not json"), Err(CoreError::Encoding(_))));
    }

    #[test]
    fn test_address_embeds_cid() {
        let record = Record::new(1, "a", "hello");
        let (cid, addressed) = record.address(Codec::DagCbor).unwrap();
        assert_eq!(addressed.cid(), Some(cid.to_string().as_str()));

        // Re-addressing an addressed record is stable.
        let (again, _) = addressed.clone().address(Codec::DagCbor).unwrap();
        assert_eq!(cid, again);
    }

    #[test]
    fn test_extra_fields_survive_plaintext() {
        let record = Record::parse(r#"{"id":"x","name":"n","content":"c","tags":["a"]}"#).unwrap();
        let (_, addressed) = record.address(Codec::DagCbor).unwrap();
        let plaintext = addressed.to_plaintext().unwrap();

        let reparsed = Record::from_slice(&plaintext).unwrap();
        assert_eq!(reparsed.fields().get("tags"), Some(&json!(["a"])));
        assert_eq!(reparsed, addressed);
    }

    #[test]
    fn test_plaintext_key_order_is_stable() {
        let a = Record::parse(r#"{"content":"c","name":"n","id":1}"#).unwrap();
        let b = Record::parse(r#"{"id":1,"name":"n","content":"c"}"#).unwrap();
        assert_eq!(a.to_plaintext().unwrap(), b.to_plaintext().unwrap());
    }
}
