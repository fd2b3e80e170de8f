//! Pipeline errors.

use std::error::Error;
use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that abort documentation of a package.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render template")]
    Template(#[from] minijinja::Error),

    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiteError {
    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| SiteError::Write { path, source }
    }

    pub(crate) fn read(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| SiteError::Read { path, source }
    }
}

/// An error and all of its sources, joined with `: `.
pub fn error_chain(error: &dyn Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_chain_joins_sources() {
        let error = SiteError::write("/out/msg-styles.css")(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));

        assert_eq!(
            error_chain(&error),
            "Failed to write /out/msg-styles.css: permission denied"
        );
    }

    #[test]
    fn transparent_config_errors_keep_their_message() {
        let error = SiteError::from(ConfigError::InvalidEntry {
            package: "pkg".to_string(),
            index: 2,
            message: "expected a mapping".to_string(),
        });

        assert_eq!(
            error.to_string(),
            "Config file for [pkg] is invalid: entry 2: expected a mapping"
        );
    }
}
