//! Epydoc backend: Python API reference.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::command::ToolCommand;
use crate::traits::{BuildJob, Builder, BuilderError, BuilderKind};

/// Directories, relative to the package, that may hold its Python module.
const MODULE_ROOTS: &[&str] = &["src", "python"];

/// Runs `epydoc --html` over the package's Python module.
#[derive(Debug)]
pub struct EpydocBuilder {
    program: String,
}

impl EpydocBuilder {
    pub fn new() -> Self {
        Self {
            program: "epydoc".to_string(),
        }
    }

    /// Use a different epydoc executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the command for a job.
    pub fn command(&self, job: &BuildJob<'_>) -> Result<ToolCommand, BuilderError> {
        let module_root = find_module_root(job.source_path, job.package).ok_or_else(|| {
            BuilderError::NothingToDocument(format!(
                "no Python module named {} under {}",
                job.package,
                job.source_path.display()
            ))
        })?;

        let mut cmd = ToolCommand::new(&self.program)
            .arg("--html")
            .arg("-o")
            .arg(job.html_dir())
            .args(["--name", job.package]);

        if let Some(config) = job.spec.get_str("config") {
            cmd = cmd.arg("--config").arg(job.source_path.join(config));
        }
        for pattern in job.spec.get_words("exclude") {
            cmd = cmd.args(["--exclude", pattern.as_str()]);
        }
        if job.quiet {
            cmd = cmd.arg("-q");
        }

        Ok(cmd
            .arg(module_root.join(job.package))
            .env("PYTHONPATH", python_path(&module_root))
            .current_dir(job.source_path))
    }
}

impl Default for EpydocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for EpydocBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Epydoc
    }

    fn build(&self, job: &BuildJob<'_>) -> Result<(), BuilderError> {
        let command = self.command(job)?;

        let html_dir = job.html_dir();
        fs::create_dir_all(&html_dir).map_err(|source| BuilderError::Io {
            path: html_dir,
            source,
        })?;

        command.run(job.quiet)
    }
}

/// First of `src/` or `python/` that contains a module named after the
/// package.
fn find_module_root(source: &Path, package: &str) -> Option<PathBuf> {
    MODULE_ROOTS
        .iter()
        .map(|root| source.join(root))
        .find(|root| root.join(package).is_dir())
}

/// `PYTHONPATH` with `root` prepended to any inherited value.
fn python_path(root: &Path) -> OsString {
    let inherited = env::var_os("PYTHONPATH").unwrap_or_default();
    let paths = std::iter::once(root.to_path_buf())
        .chain(env::split_paths(&inherited).filter(|p| !p.as_os_str().is_empty()));
    env::join_paths(paths).unwrap_or_else(|_| root.as_os_str().to_os_string())
}
