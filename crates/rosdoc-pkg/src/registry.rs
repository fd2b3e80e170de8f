//! Package registry for resolving package names to paths and manifests.
//!
//! Crawls every directory on the package search path, stopping descent at
//! the first directory that holds a manifest. Earlier search-path entries
//! take precedence over later ones.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::manifest::{self, Manifest, ManifestError};

/// Environment variable holding the package search path.
pub const PACKAGE_PATH_VAR: &str = "ROS_PACKAGE_PATH";

/// Marker files that exclude a directory tree from the crawl.
const IGNORE_MARKERS: &[&str] = &["CATKIN_IGNORE", "COLCON_IGNORE", "AMENT_IGNORE"];

/// A documentable package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name, unique within the registry
    pub name: String,

    /// Absolute path of the package directory
    pub path: PathBuf,

    /// Parsed manifest
    pub manifest: Manifest,
}

impl Package {
    /// Load the package rooted at `dir`.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let manifest = Manifest::load(&path)?;

        Ok(Self {
            name: manifest.name.clone(),
            path,
            manifest,
        })
    }
}

/// Registry of every package found on a search path.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: BTreeMap<String, Package>,
}

impl PackageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Crawl the directories listed in `ROS_PACKAGE_PATH`.
    pub fn from_env() -> Result<Self, RegistryError> {
        let value = env::var_os(PACKAGE_PATH_VAR).ok_or(RegistryError::NoSearchPath)?;
        let roots: Vec<PathBuf> = env::split_paths(&value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self::crawl(&roots)
    }

    /// Crawl each root in order and collect the packages found.
    pub fn crawl(roots: &[PathBuf]) -> Result<Self, RegistryError> {
        if roots.is_empty() {
            return Err(RegistryError::NoSearchPath);
        }

        let mut registry = Self::new();
        for root in roots {
            if !root.is_dir() {
                tracing::warn!("Package path entry does not exist: {}", root.display());
                continue;
            }
            let found = registry.scan(root);
            tracing::debug!("Found {} packages under {}", found, root.display());
        }

        Ok(registry)
    }

    /// Scan one search-path root. Returns the number of packages added.
    fn scan(&mut self, root: &Path) -> usize {
        let mut count = 0;
        let mut walker = WalkDir::new(root).follow_links(true).into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            if entry.depth() > 0 && is_hidden(dir) {
                walker.skip_current_dir();
                continue;
            }
            if IGNORE_MARKERS.iter().any(|m| dir.join(m).exists()) {
                walker.skip_current_dir();
                continue;
            }
            if manifest::locate(dir).is_none() {
                continue;
            }

            // Packages never nest.
            walker.skip_current_dir();

            match Package::load(dir) {
                Ok(package) => {
                    if self.packages.contains_key(&package.name) {
                        tracing::debug!(
                            "Ignoring duplicate package {} at {}",
                            package.name,
                            package.path.display()
                        );
                        continue;
                    }
                    self.packages.insert(package.name.clone(), package);
                    count += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping package at {}: {}", dir.display(), e);
                }
            }
        }

        count
    }

    /// Look up a package by name.
    pub fn get(&self, name: &str) -> Result<&Package, RegistryError> {
        self.packages
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Filesystem path of a package.
    pub fn path(&self, name: &str) -> Result<&Path, RegistryError> {
        self.get(name).map(|p| p.path.as_path())
    }

    /// Manifest of a package.
    pub fn manifest(&self, name: &str) -> Result<&Manifest, RegistryError> {
        self.get(name).map(|p| &p.manifest)
    }

    /// All registered package names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.packages.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Errors that can occur with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No package search path given and {PACKAGE_PATH_VAR} is not set")]
    NoSearchPath,

    #[error("Package not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_package(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package.xml"),
            format!("<package format=\"2\"><name>{name}</name><version>0.1.0</version></package>"),
        )
        .unwrap();
    }

    #[test]
    fn crawls_nested_packages() {
        let temp = tempdir().unwrap();
        write_package(&temp.path().join("stack/alpha"), "alpha");
        write_package(&temp.path().join("beta_dir"), "beta");

        let registry = PackageRegistry::crawl(&[temp.path().to_path_buf()]).unwrap();

        assert_eq!(registry.names(), vec!["alpha", "beta"]);
        assert!(registry.path("beta").unwrap().ends_with("beta_dir"));
        assert_eq!(
            registry.manifest("alpha").unwrap().version.as_deref(),
            Some("0.1.0")
        );
    }

    #[test]
    fn does_not_descend_into_packages() {
        let temp = tempdir().unwrap();
        write_package(&temp.path().join("outer"), "outer");
        write_package(&temp.path().join("outer/inner"), "inner");

        let registry = PackageRegistry::crawl(&[temp.path().to_path_buf()]).unwrap();

        assert_eq!(registry.names(), vec!["outer"]);
    }

    #[test]
    fn honours_ignore_markers_and_hidden_dirs() {
        let temp = tempdir().unwrap();
        write_package(&temp.path().join("ignored/pkg"), "ignored_pkg");
        fs::write(temp.path().join("ignored/CATKIN_IGNORE"), "").unwrap();
        write_package(&temp.path().join(".hidden/pkg"), "hidden_pkg");

        let registry = PackageRegistry::crawl(&[temp.path().to_path_buf()]).unwrap();

        assert!(registry.is_empty());
    }

    #[test]
    fn earlier_roots_win() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        write_package(&first.path().join("dup"), "dup");
        write_package(&second.path().join("dup"), "dup");

        let registry = PackageRegistry::crawl(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .unwrap();

        let path = registry.path("dup").unwrap();
        assert!(path.starts_with(fs::canonicalize(first.path()).unwrap()));
    }

    #[test]
    fn unknown_package_is_an_error() {
        let temp = tempdir().unwrap();
        let registry = PackageRegistry::crawl(&[temp.path().to_path_buf()]).unwrap();

        assert!(matches!(
            registry.get("nope"),
            Err(RegistryError::NotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn empty_search_path_is_an_error() {
        assert!(matches!(
            PackageRegistry::crawl(&[]),
            Err(RegistryError::NoSearchPath)
        ));
    }
}
