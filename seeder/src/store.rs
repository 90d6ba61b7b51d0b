//! The two storage shapes the loaders write into.

use anyhow::Result;
use fireseed_types::DocumentPath;
use serde_json::{Map, Value};

/// A store of named collections holding uniquely keyed documents.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Replace the document at `path` with `body`, creating it when missing.
    async fn set_document(&self, path: &DocumentPath, body: &Map<String, Value>) -> Result<()>;
}

/// A single nested tree addressed by path.
#[allow(async_fn_in_trait)]
pub trait TreeStore {
    /// Replace everything stored at the root with `tree`.
    async fn set_root(&self, tree: &Value) -> Result<()>;
}
