//! Hierarchical overwrite: the whole dataset replaces the store root in one call.

use fireseed_types::Dataset;
use tracing::info;

use crate::store::TreeStore;

/// Result of a root overwrite. A failure is reported, not propagated.
#[derive(Debug)]
pub enum TreeOutcome {
    Written,
    Failed(anyhow::Error),
}

pub async fn overwrite_tree<S: TreeStore>(store: &S, dataset: &Dataset) -> TreeOutcome {
    match store.set_root(dataset.root()).await {
        Ok(()) => {
            info!("root overwritten");
            TreeOutcome::Written
        }
        Err(e) => TreeOutcome::Failed(e),
    }
}
