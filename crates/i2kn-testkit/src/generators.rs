//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use i2kn_core::{NodeKey, Record};

/// Generate a random node key.
pub fn node_key() -> impl Strategy<Value = NodeKey> {
    any::<[u8; 32]>().prop_map(|seed| NodeKey::from_seed(&seed).expect("seeded key"))
}

/// Generate a JSON scalar.
///
/// Floats are multiples of 1/64 so their decimal text parses back exactly.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<i16>().prop_map(|n| Value::from(f64::from(n) / 64.0)),
        "[ -~]{0,24}".prop_map(Value::String),
    ]
}

/// Generate nested JSON content.
pub fn json_content() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate a record id: integers or short strings.
pub fn record_id() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u32>().prop_map(Value::from),
        "[a-z0-9-]{1,16}".prop_map(Value::String),
    ]
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub id: Value,
    pub name: String,
    pub content: Value,
    /// Non-semantic fields riding along.
    pub extra: Vec<(String, Value)>,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            record_id(),
            "[ -~]{0,32}",
            json_content(),
            prop::collection::vec(("x_[a-z]{1,8}", json_leaf()), 0..3),
        )
            .prop_map(|(id, name, content, extra)| RecordParams {
                id,
                name,
                content,
                extra,
            })
            .boxed()
    }
}

/// Build a record with fields inserted in the given order.
pub fn record_from_params(params: &RecordParams, reversed: bool) -> Record {
    let mut fields: Vec<(String, Value)> = vec![
        ("id".into(), params.id.clone()),
        ("name".into(), Value::String(params.name.clone())),
        ("content".into(), params.content.clone()),
    ];
    fields.extend(params.extra.iter().cloned());
    if reversed {
        fields.reverse();
    }

    let map: Map<String, Value> = fields.into_iter().collect();
    Record::from_value(Value::Object(map)).expect("object is a valid record")
}

/// Render a record as JSON text with its keys in the given order.
///
/// `serde_json::Map` keeps keys sorted, so a reordered record only exists as
/// text. With `reversed`, top-level fields come `content`, `name`, `id` after
/// the extras, and every nested object lists its keys in descending order.
pub fn record_json_text(params: &RecordParams, reversed: bool) -> String {
    let mut fields: Vec<(String, Value)> = vec![
        ("id".into(), params.id.clone()),
        ("name".into(), Value::String(params.name.clone())),
        ("content".into(), params.content.clone()),
    ];
    fields.extend(params.extra.iter().cloned());
    if reversed {
        fields.reverse();
    }

    let mut out = String::from("{");
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        write_value(&mut out, value, reversed);
    }
    out.push('}');
    out
}

fn write_value(out: &mut String, value: &Value, reversed: bool) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, reversed);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            if reversed {
                entries.reverse();
            }
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_value(out, item, reversed);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
