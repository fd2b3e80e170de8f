//! Static assets written next to the generated docs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SiteError;

/// File name of the message docs stylesheet.
pub const STYLESHEET_NAME: &str = "msg-styles.css";

const STYLESHEET: &str = include_str!("../assets/msg-styles.css");

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The bundled stylesheet.
    pub fn stylesheet() -> &'static str {
        STYLESHEET
    }

    /// Write the stylesheet into `output_dir`, returning its path.
    pub fn write_stylesheet(output_dir: &Path) -> Result<PathBuf, SiteError> {
        fs::create_dir_all(output_dir).map_err(SiteError::write(output_dir))?;

        let path = output_dir.join(STYLESHEET_NAME);
        fs::write(&path, STYLESHEET).map_err(SiteError::write(&path))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}
