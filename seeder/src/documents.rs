//! Document-collection bulk load.
//!
//! The dataset's first level names collections, the second level names
//! documents. Each document is overwritten in dataset order, one request at a
//! time. The first failed write aborts the run; documents already written stay
//! written.

use anyhow::{Context, Result};
use fireseed_types::{Dataset, DocumentPath};
use std::collections::HashSet;
use tracing::info;

use crate::store::DocumentStore;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DocumentLoadStats {
    pub collections: usize,
    pub documents: usize,
}

/// Write every document in `dataset` to `store`, calling `on_written` after each.
pub async fn load_documents<S, F>(
    store: &S,
    dataset: &Dataset,
    mut on_written: F,
) -> Result<DocumentLoadStats>
where
    S: DocumentStore,
    F: FnMut(&DocumentPath),
{
    let writes = dataset.plan_documents()?;
    let total = writes.len();
    info!(documents = total, "planned document writes");

    let mut collections = HashSet::new();
    let mut stats = DocumentLoadStats::default();

    for write in &writes {
        let position = stats.documents + 1;
        store
            .set_document(&write.path, &write.body)
            .await
            .with_context(|| format!("upload {} ({position} of {total})", write.path))?;

        if collections.insert(write.path.collection()) {
            stats.collections += 1;
        }
        stats.documents += 1;
        on_written(&write.path);
    }

    Ok(stats)
}
