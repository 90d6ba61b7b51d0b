use serde_json::{Map, Value};
use std::fmt;

use crate::dataset::ShapeError;

/// Firestore caps document ids at 1500 bytes.
const MAX_ID_BYTES: usize = 1500;

/// Address of a single document, rendered as `/<collection>/<document>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: String,
    document: String,
}

impl DocumentPath {
    pub fn new(collection: &str, document: &str) -> Result<Self, ShapeError> {
        validate_id("collection", collection)?;
        validate_id("document", document)?;
        Ok(Self {
            collection: collection.to_string(),
            document: document.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.collection, self.document)
    }
}

/// One planned overwrite: the full body replaces whatever is stored at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub path: DocumentPath,
    pub body: Map<String, Value>,
}

fn validate_id(kind: &'static str, key: &str) -> Result<(), ShapeError> {
    let reason = if key.is_empty() {
        Some("must not be empty")
    } else if key.contains('/') {
        Some("must not contain '/'")
    } else if key == "." || key == ".." {
        Some("must not be '.' or '..'")
    } else if key.len() >= 4 && key.starts_with("__") && key.ends_with("__") {
        Some("ids of the form __name__ are reserved")
    } else if key.len() > MAX_ID_BYTES {
        Some("must be at most 1500 bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ShapeError::InvalidKey {
            kind,
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
