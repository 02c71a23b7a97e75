use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};

pub const DEFAULT_MANIFEST_FILENAME: &str = "manifest.json";

/// One artifact produced by the page-scraping flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub filename: String,
    pub page: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Writes `entries` as a pretty JSON array, replacing any previous manifest.
pub fn write_manifest(
    dir: &Path,
    filename: &str,
    entries: &[ManifestEntry],
) -> Result<PathBuf, ManifestError> {
    let json = serde_json::to_string_pretty(entries)?;
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    Ok(writer.write(filename, &json)?)
}
