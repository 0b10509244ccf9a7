//! System process runner

use std::process::{Command, Stdio};

use tracing::debug;

use crate::domain::ports::{CommandError, CommandOutput, CommandRunner, CommandSpec};

/// Runs commands on the local machine, capturing stdout and stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Whether a program resolves on PATH
    pub fn is_available(program: &str) -> bool {
        which::which(program).is_ok()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let program = which::which(&spec.program).map_err(|_| CommandError::NotFound {
            program: spec.program.clone(),
        })?;
        debug!(command = %spec.display(), cwd = ?spec.cwd, "running");

        let mut command = Command::new(program);
        command
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let output = command.output().map_err(|e| CommandError::Spawn {
            program: spec.program.clone(),
            message: e.to_string(),
        })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
