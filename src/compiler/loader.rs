use crate::document::ConfigDocument;
use crate::graph::Snapshot;
use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::Path;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Reads an editor graph saved as JSON, or YAML for `.yaml`/`.yml` files.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file from {}", path.display()))?;

    let snapshot = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize YAML graph from {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to deserialize JSON graph from {}", path.display()))?
    };

    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(snapshot)?
    } else {
        serde_json::to_string_pretty(snapshot)?
    };
    fs::write(path, content)
        .with_context(|| format!("Failed to write graph file to {}", path.display()))
}

/// Reads a previously exported configuration document.
pub fn load_document(path: &Path) -> Result<ConfigDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document from {}", path.display()))?;

    let document = ConfigDocument::from_json(&content)
        .with_context(|| format!("Failed to import document from {}", path.display()))?;

    Ok(document)
}
