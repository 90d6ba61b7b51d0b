use serde_json::Value;
use thiserror::Error;

use crate::document::{DocumentPath, DocumentWrite};

/// An untyped JSON tree loaded from disk. Key order follows the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset(Value);

/// Reasons a dataset cannot be read as `collection -> document id -> body`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("dataset root must be an object or array of collections, found {found}")]
    RootNotMapping { found: &'static str },

    #[error("collection '{collection}' must be an object or array of documents, found {found}")]
    CollectionNotMapping {
        collection: String,
        found: &'static str,
    },

    #[error("document {path} must be an object, found {found}")]
    DocumentNotObject { path: String, found: &'static str },

    #[error("document {path} field '{field}' is an array directly inside an array")]
    NestedArray { path: String, field: String },

    #[error("invalid {kind} id '{key}': {reason}")]
    InvalidKey {
        kind: &'static str,
        key: String,
        reason: &'static str,
    },
}

impl Dataset {
    pub fn new(root: Value) -> Self {
        Self(root)
    }

    pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input).map(Self)
    }

    pub fn root(&self) -> &Value {
        &self.0
    }

    /// Flatten the first two levels into one write per document, in dataset order.
    ///
    /// Arrays at either level are read as mappings keyed by index (`"0"`, `"1"`, ...).
    /// Every shape problem is reported here, so a caller that plans first never
    /// starts writing a dataset it cannot finish for structural reasons.
    pub fn plan_documents(&self) -> Result<Vec<DocumentWrite>, ShapeError> {
        let collections = entries(&self.0).ok_or(ShapeError::RootNotMapping {
            found: value_kind(&self.0),
        })?;

        let mut writes = Vec::new();
        for (collection, documents) in collections {
            let documents =
                entries(documents).ok_or_else(|| ShapeError::CollectionNotMapping {
                    collection: collection.clone(),
                    found: value_kind(documents),
                })?;

            for (doc_id, body) in documents {
                let path = DocumentPath::new(&collection, &doc_id)?;
                let Value::Object(body) = body else {
                    return Err(ShapeError::DocumentNotObject {
                        path: path.to_string(),
                        found: value_kind(body),
                    });
                };
                if let Some(field) = nested_array_field(body.iter(), "") {
                    return Err(ShapeError::NestedArray {
                        path: path.to_string(),
                        field,
                    });
                }
                writes.push(DocumentWrite {
                    path,
                    body: body.clone(),
                });
            }
        }
        Ok(writes)
    }
}

/// Key/value pairs of an object, or index/item pairs of an array.
fn entries(value: &Value) -> Option<Vec<(String, &Value)>> {
    match value {
        Value::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        _ => None,
    }
}

/// First field holding an array directly inside an array. Firestore rejects those.
fn nested_array_field<'a>(
    fields: impl Iterator<Item = (&'a String, &'a Value)>,
    prefix: &str,
) -> Option<String> {
    for (key, value) in fields {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(found) = nested_array_in_value(value, &field) {
            return Some(found);
        }
    }
    None
}

fn nested_array_in_value(value: &Value, field: &str) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().enumerate().find_map(|(i, item)| {
            let at = format!("{field}[{i}]");
            match item {
                Value::Array(_) => Some(at),
                other => nested_array_in_value(other, &at),
            }
        }),
        Value::Object(map) => nested_array_field(map.iter(), field),
        _ => None,
    }
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
