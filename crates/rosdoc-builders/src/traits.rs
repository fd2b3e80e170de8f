//! Trait definitions for documentation builders.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use rosdoc_pkg::Manifest;

use crate::spec::BuilderSpec;

/// Identifier of a known builder backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuilderKind {
    /// C/C++ API reference, also the cross-reference (tag file) tool
    Doxygen,
    /// Python API reference
    Epydoc,
    /// Narrative documentation
    Sphinx,
}

impl BuilderKind {
    /// Every known kind, in dispatch order.
    pub const ALL: [BuilderKind; 3] = [BuilderKind::Doxygen, BuilderKind::Epydoc, BuilderKind::Sphinx];

    /// The builder used when a package has no usable configuration.
    pub const PRIMARY: BuilderKind = BuilderKind::Doxygen;

    /// The builder that consumes and produces tag files.
    pub const CROSS_REFERENCE: BuilderKind = BuilderKind::Doxygen;

    /// Name used for this builder in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            BuilderKind::Doxygen => "doxygen",
            BuilderKind::Epydoc => "epydoc",
            BuilderKind::Sphinx => "sphinx",
        }
    }

    /// Exact-match lookup by configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a builder needs to document one package.
#[derive(Debug, Clone, Copy)]
pub struct BuildJob<'a> {
    /// Package source directory
    pub source_path: &'a Path,

    /// Package name
    pub package: &'a str,

    /// Package manifest
    pub manifest: &'a Manifest,

    /// This builder's parameters
    pub spec: &'a BuilderSpec,

    /// Documentation root
    pub output_dir: &'a Path,

    /// Suppress tool diagnostics
    pub quiet: bool,
}

impl BuildJob<'_> {
    /// Directory this builder writes HTML into.
    pub fn html_dir(&self) -> PathBuf {
        if self.spec.targets_root() {
            self.output_dir.to_path_buf()
        } else {
            self.output_dir.join(self.spec.output_dir())
        }
    }
}

/// Errors that can occur while running a builder.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("Failed to launch {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    ToolFailed { program: String, status: ExitStatus },

    #[error("Failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid tag file list {path}: {message}")]
    TagfileSpec { path: PathBuf, message: String },

    #[error("Nothing to document: {0}")]
    NothingToDocument(String),
}

/// A documentation backend.
pub trait Builder {
    /// Which backend this is.
    fn kind(&self) -> BuilderKind;

    /// Generate documentation for one package.
    fn build(&self, job: &BuildJob<'_>) -> Result<(), BuilderError>;
}
