use anyhow::{Context, Result};
use fireseed_types::Dataset;
use std::fs;
use std::path::Path;

/// Read and parse the whole dataset file before anything is written.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset at {}", path.display()))?;
    let dataset = Dataset::from_json_str(&raw)
        .with_context(|| format!("parse dataset at {} as JSON", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "loaded dataset");
    Ok(dataset)
}
