//! Tag file lists for cross-referencing other packages' API docs.
//!
//! A tag file list is a YAML sequence of entries:
//!
//! ```yaml
//! - docs_url: http://docs.example.org/api/roscpp/html
//!   location: file:///var/tags/roscpp.tag
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::traits::BuilderError;

/// One tag file and the URL its documentation is published at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagfileEntry {
    pub docs_url: String,
    pub location: String,
}

impl TagfileEntry {
    /// Local filesystem path of the tag file. `None` for remote locations.
    pub fn local_path(&self) -> Option<PathBuf> {
        if let Some(path) = self.location.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if self.location.contains("://") {
            return None;
        }
        Some(PathBuf::from(&self.location))
    }
}

/// Load a tag file list.
pub fn load_tagfile_spec(path: &Path) -> Result<Vec<TagfileEntry>, BuilderError> {
    let content = fs::read_to_string(path).map_err(|e| BuilderError::TagfileSpec {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_yaml::from_str(&content).map_err(|e| BuilderError::TagfileSpec {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Doxygen `TAGFILES` entries (`path=url`) for the local tag files in a list.
/// Remote locations are skipped.
pub fn doxygen_tagfiles(entries: &[TagfileEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| match entry.local_path() {
            Some(path) => Some(format!("{}={}", path.display(), entry.docs_url)),
            None => {
                tracing::warn!(
                    "Skipping remote tag file {} (only local tag files are supported)",
                    entry.location
                );
                None
            }
        })
        .collect()
}
