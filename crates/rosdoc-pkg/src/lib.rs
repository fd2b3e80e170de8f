//! Package discovery and manifest parsing for rosdoc.
//!
//! This crate resolves package names to directories by crawling a package
//! search path, and parses `package.xml` / `manifest.xml` metadata.

pub mod manifest;
pub mod registry;

pub use manifest::{Export, Link, Manifest, ManifestError, ManifestKind, Person};
pub use registry::{Package, PackageRegistry, RegistryError, PACKAGE_PATH_VAR};
