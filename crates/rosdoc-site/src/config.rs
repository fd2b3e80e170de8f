//! Per-package documentation configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use rosdoc_pkg::Manifest;
use serde_yaml::Value;

use crate::error::error_chain;

/// Configuration file looked for when the manifest exports none.
pub const DEFAULT_CONFIG_FILE: &str = "rosdoc.yaml";

/// Manifest export tag declaring configuration files.
pub const EXPORT_TAG: &str = "rosdoc";

/// Attribute of [`EXPORT_TAG`] holding the configuration path.
pub const EXPORT_ATTR: &str = "config";

/// Placeholder in exported paths that stands for the package directory.
pub const PREFIX_PLACEHOLDER: &str = "${prefix}";

/// Configuration as loaded, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawConfig {
    /// No configuration file, or an empty one
    #[default]
    Absent,
    /// Parsed YAML of any shape
    Loaded(Value),
}

/// Load the documentation configuration for the package at `path`.
///
/// Exported configuration files take precedence over `rosdoc.yaml`. When
/// several are exported, the last one that loads wins. Load failures are
/// logged and never abort the run.
pub fn load_config(path: &Path, manifest: &Manifest) -> RawConfig {
    let exported = manifest.exports(EXPORT_TAG, EXPORT_ATTR);

    if !exported.is_empty() {
        let prefix = path.to_string_lossy();
        let mut config = RawConfig::Absent;

        for declared in exported {
            let config_path = path.join(declared.replace(PREFIX_PLACEHOLDER, &prefix));
            match read_config(&config_path) {
                Ok(loaded) => config = loaded,
                Err(e) => tracing::error!("{}", load_failure(&manifest.name, &e)),
            }
        }

        return config;
    }

    let default_path = path.join(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        return read_config(&default_path).unwrap_or_else(|e| {
            tracing::error!("{}", load_failure(&manifest.name, &e));
            RawConfig::Absent
        });
    }

    RawConfig::Absent
}

fn load_failure(package: &str, error: &ConfigError) -> String {
    format!(
        "Unable to load rosdoc config file for [{}]: {}",
        package,
        error_chain(error)
    )
}

/// Read and parse one configuration file.
pub fn read_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(RawConfig::Absent);
    }

    let value: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match value {
        Value::Null => RawConfig::Absent,
        value => RawConfig::Loaded(value),
    })
}

/// Errors that can occur when loading or normalizing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config file for [{package}] is invalid: entry {index}: {message}")]
    InvalidEntry {
        package: String,
        index: usize,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rosdoc_pkg::ManifestKind;
    use tempfile::tempdir;

    fn manifest(exports: &str) -> Manifest {
        Manifest::parse(
            &format!("<package><name>pkg</name><export>{exports}</export></package>"),
            ManifestKind::Package,
            "",
        )
        .unwrap()
    }

    fn loaded(yaml: &str) -> RawConfig {
        RawConfig::Loaded(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn absent_without_any_config() {
        let temp = tempdir().unwrap();
        assert_eq!(load_config(temp.path(), &manifest("")), RawConfig::Absent);
    }

    #[test]
    fn reads_default_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("rosdoc.yaml"), "- builder: sphinx\n").unwrap();

        assert_eq!(
            load_config(temp.path(), &manifest("")),
            loaded("- builder: sphinx")
        );
    }

    #[test]
    fn exported_config_replaces_prefix() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("doc")).unwrap();
        fs::write(temp.path().join("doc/docs.yaml"), "- builder: epydoc\n").unwrap();
        // The default file is ignored once a config is exported.
        fs::write(temp.path().join("rosdoc.yaml"), "- builder: sphinx\n").unwrap();

        let config = load_config(
            temp.path(),
            &manifest(r#"<rosdoc config="${prefix}/doc/docs.yaml"/>"#),
        );

        assert_eq!(config, loaded("- builder: epydoc"));
    }

    #[test]
    fn last_loadable_export_wins() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.yaml"), "- builder: epydoc\n").unwrap();
        fs::write(temp.path().join("b.yaml"), "- builder: sphinx\n").unwrap();

        let both = load_config(
            temp.path(),
            &manifest(r#"<rosdoc config="a.yaml"/><rosdoc config="b.yaml"/>"#),
        );
        assert_eq!(both, loaded("- builder: sphinx"));

        let broken_last = load_config(
            temp.path(),
            &manifest(r#"<rosdoc config="a.yaml"/><rosdoc config="missing.yaml"/>"#),
        );
        assert_eq!(broken_last, loaded("- builder: epydoc"));
    }

    #[test]
    fn unreadable_export_leaves_config_absent() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("bad.yaml"), "- builder: [unclosed\n").unwrap();

        let config = load_config(temp.path(), &manifest(r#"<rosdoc config="bad.yaml"/>"#));

        assert_eq!(config, RawConfig::Absent);
    }

    #[test]
    fn load_failure_names_package_and_file() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("doc/missing.yaml");
        let error = read_config(&missing).unwrap_err();

        let message = load_failure("nav_tools", &error);

        assert!(message.starts_with("Unable to load rosdoc config file for [nav_tools]: "));
        assert!(message.contains(&format!("Failed to read {}", missing.display())));
    }

    #[test]
    fn read_config_classifies_errors() {
        let temp = tempdir().unwrap();
        assert!(matches!(
            read_config(&temp.path().join("nope.yaml")),
            Err(ConfigError::Read { .. })
        ));

        let bad = temp.path().join("bad.yaml");
        fs::write(&bad, "key: [1, 2").unwrap();
        assert!(matches!(read_config(&bad), Err(ConfigError::Parse { .. })));

        let empty = temp.path().join("empty.yaml");
        fs::write(&empty, "\n").unwrap();
        assert_eq!(read_config(&empty).unwrap(), RawConfig::Absent);
    }
}
