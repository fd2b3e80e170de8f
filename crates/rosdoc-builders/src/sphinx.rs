//! Sphinx backend: narrative documentation.

use std::fs;

use crate::command::ToolCommand;
use crate::traits::{BuildJob, Builder, BuilderError, BuilderKind};

/// Runs `sphinx-build -b html` on the package's Sphinx project.
#[derive(Debug)]
pub struct SphinxBuilder {
    program: String,
}

impl SphinxBuilder {
    pub fn new() -> Self {
        Self {
            program: "sphinx-build".to_string(),
        }
    }

    /// Use a different sphinx-build executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the command for a job.
    pub fn command(&self, job: &BuildJob<'_>) -> Result<ToolCommand, BuilderError> {
        let root = job
            .source_path
            .join(job.spec.get_str("sphinx_root_dir").unwrap_or("."));

        if !root.join("conf.py").is_file() {
            return Err(BuilderError::NothingToDocument(format!(
                "no conf.py in {}",
                root.display()
            )));
        }

        let mut cmd = ToolCommand::new(&self.program).args(["-a", "-E", "-b", "html"]);
        if job.quiet {
            cmd = cmd.arg("-q");
        }

        Ok(cmd
            .arg(&root)
            .arg(job.html_dir())
            .current_dir(&root))
    }
}

impl Default for SphinxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for SphinxBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Sphinx
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::BuilderSpec;
    use pretty_assertions::assert_eq;
    use rosdoc_pkg::{Manifest, ManifestKind};
    use std::path::Path;

    #[test]
    fn builds_command_from_root_dir() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("doc");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("conf.py"), "project = 'x'\n").unwrap();

        let manifest =
            Manifest::parse("<package><name>x</name></package>", ManifestKind::Package, "").unwrap();
        let spec = BuilderSpec::new("sphinx")
            .with("sphinx_root_dir", "doc")
            .with("output_dir", "manual");
        let job = BuildJob {
            source_path: temp.path(),
            package: "x",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/out"),
            quiet: true,
        };

        let cmd = SphinxBuilder::new().command(&job).unwrap();
        let root_arg = root.display().to_string();

        assert_eq!(cmd.program(), "sphinx-build");
        assert_eq!(
            cmd.arg_strings(),
            vec!["-a", "-E", "-b", "html", "-q", root_arg.as_str(), "/out/manual"]
        );
        assert_eq!(cmd.working_dir(), Some(root.as_path()));
    }

    #[test]
    fn requires_conf_py() {
        let temp = tempfile::tempdir().unwrap();
        let manifest =
            Manifest::parse("<package><name>x</name></package>", ManifestKind::Package, "").unwrap();
        let spec = BuilderSpec::new("sphinx");
        let job = BuildJob {
            source_path: temp.path(),
            package: "x",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/out"),
            quiet: true,
        };

        assert!(matches!(
            SphinxBuilder::new().command(&job),
            Err(BuilderError::NothingToDocument(_))
        ));
    }
}
