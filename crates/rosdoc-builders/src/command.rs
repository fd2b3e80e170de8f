//! Running external documentation tools.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::traits::BuilderError;

/// An external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments as lossy strings.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Value set for an environment variable, if any.
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Run to completion.
    ///
    /// Tool stdout goes to the debug log. Tool stderr goes to the warn log
    /// unless `quiet` is set.
    pub fn run(&self, quiet: bool) -> Result<(), BuilderError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if quiet { Stdio::null() } else { Stdio::piped() });

        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        tracing::debug!("Running {} {}", self.program, self.arg_strings().join(" "));

        let output = command.output().map_err(|source| BuilderError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!("{}: {}", self.program, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            tracing::warn!("{}: {}", self.program, line);
        }

        if !output.status.success() {
            return Err(BuilderError::ToolFailed {
                program: self.program.clone(),
                status: output.status,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_arguments_and_environment() {
        let cmd = ToolCommand::new("tool")
            .arg("--html")
            .args(["-o", "out"])
            .env("PYTHONPATH", "/a")
            .env("PYTHONPATH", "/b")
            .current_dir("/work");

        assert_eq!(cmd.program(), "tool");
        assert_eq!(cmd.arg_strings(), vec!["--html", "-o", "out"]);
        assert_eq!(cmd.env_value("PYTHONPATH"), Some(OsStr::new("/b")));
        assert_eq!(cmd.working_dir(), Some(Path::new("/work")));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let result = ToolCommand::new("rosdoc-test-no-such-program").run(true);
        assert!(matches!(result, Err(BuilderError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let result = ToolCommand::new("sh").args(["-c", "exit 3"]).run(true);
        assert!(matches!(result, Err(BuilderError::ToolFailed { .. })));

        ToolCommand::new("sh").args(["-c", "echo ok"]).run(false).unwrap();
    }
}
