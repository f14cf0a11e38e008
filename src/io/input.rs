use std::path::Path;

use anyhow::{Context, Result};

/// Read the source document a pipeline will run over
pub fn read_source_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}
