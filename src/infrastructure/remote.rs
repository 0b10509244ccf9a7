//! SSH/SCP contract against a provisioned host

use std::path::{Path, PathBuf};

use crate::domain::ports::CommandSpec;

/// Non-interactive options; fresh hosts have unknown host keys
const SSH_OPTIONS: [&str; 8] = [
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
    "-o",
    "BatchMode=yes",
    "-o",
    "ConnectTimeout=10",
];

/// A host reachable over SSH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    user: String,
    host: String,
    identity: Option<PathBuf>,
}

impl RemoteHost {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Option<PathBuf>) -> Self {
        self.identity = identity;
        self
    }

    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn with_options(&self, program: &str) -> CommandSpec {
        let spec = CommandSpec::new(program).args(SSH_OPTIONS);
        match &self.identity {
            Some(key) => spec.arg("-i").arg(key.to_string_lossy()),
            None => spec,
        }
    }

    /// Run a shell command on the host
    pub fn exec(&self, command: &str) -> CommandSpec {
        self.with_options("ssh").arg(self.destination()).arg(command)
    }

    /// Succeeds once `path` exists as a regular file on the host
    pub fn has_file(&self, path: &str) -> CommandSpec {
        self.exec(&format!("test -f {}", path))
    }

    /// Recursive copy of a local directory to `remote_path`
    pub fn upload_dir(&self, local: &Path, remote_path: &str) -> CommandSpec {
        self.with_options("scp")
            .arg("-r")
            .arg(local.to_string_lossy())
            .arg(format!("{}:{}", self.destination(), remote_path))
    }

    /// Copy one local file to `remote_path`
    pub fn upload_file(&self, local: &Path, remote_path: &str) -> CommandSpec {
        self.with_options("scp")
            .arg(local.to_string_lossy())
            .arg(format!("{}:{}", self.destination(), remote_path))
    }

    /// Execute an uploaded script with elevated privileges
    pub fn run_script(&self, remote_path: &str) -> CommandSpec {
        self.exec(&format!("sudo bash {}", remote_path))
    }
}
