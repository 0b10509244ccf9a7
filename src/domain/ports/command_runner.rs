//! CommandRunner port - external executables
//!
//! Every external tool the orchestrator drives (git, the infra-as-code
//! tool, ssh/scp, docker, the build shell) goes through this trait so the
//! pipeline can be exercised against a scripted runner in tests.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Argument prefixes whose value must never reach a log line
const SECRET_VARS: [&str; 1] = ["db_password="];

/// A fully described process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-like rendering with secret variable values masked
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in &self.args {
            let masked = SECRET_VARS
                .iter()
                .find(|prefix| arg.starts_with(*prefix))
                .map(|prefix| format!("{}***", prefix));
            parts.push(masked.unwrap_or_else(|| arg.clone()));
        }
        parts.join(" ")
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stderr if present, otherwise stdout, trimmed
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// The process could not be run at all
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("'{program}' not found on PATH")]
    NotFound { program: String },

    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },
}

/// Runs external processes to completion
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        (**self).run(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_masks_database_password() {
        let spec = CommandSpec::new("terraform")
            .arg("plan")
            .arg("-var")
            .arg("db_password=hunter2hunter2")
            .arg("-var")
            .arg("app_name=ad-1");
        let shown = spec.display();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("db_password=***"));
        assert!(shown.contains("app_name=ad-1"));
    }

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = CommandOutput {
            code: Some(1),
            stdout: "partial".to_string(),
            stderr: "  Error: denied\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "Error: denied");
        assert!(!output.success());

        let quiet = CommandOutput {
            code: Some(1),
            stdout: "only stdout".to_string(),
            stderr: String::new(),
        };
        assert_eq!(quiet.diagnostic(), "only stdout");
    }
}
