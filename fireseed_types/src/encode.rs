//! Conversion from plain JSON to the typed value envelope used by the
//! Firestore REST API (`{"stringValue": "..."}`, `{"mapValue": {...}}`, ...).

use serde_json::{json, Map, Value};

/// Encode a document body as the `fields` object of a Firestore document.
pub fn document_fields(body: &Map<String, Value>) -> Value {
    Value::Object(encode_map(body))
}

/// Encode a single JSON value.
///
/// Integers that fit in `i64` become `integerValue` (sent as a decimal string,
/// as the REST API expects); larger unsigned integers and floats become
/// `doubleValue`.
pub fn firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(f64::NAN) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}

fn encode_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), firestore_value(v)))
        .collect()
}
