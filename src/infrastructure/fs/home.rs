//! Home directory resolution with test isolation support.
//!
//! `autodeploy_home_dir()` checks `AUTODEPLOY_TEST_HOME` first, then falls
//! back to `dirs::home_dir()`. Everything that reads per-user files (user
//! config, SSH public keys) goes through it so tests never touch the real
//! home directory.

use std::path::{Path, PathBuf};

/// Environment variable for test isolation of the home directory.
pub const AUTODEPLOY_TEST_HOME_VAR: &str = "AUTODEPLOY_TEST_HOME";

/// Value passed to the IaC tool when no local public key exists
pub const PLACEHOLDER_SSH_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQC autodeploy-placeholder";

const DEFAULT_PUBLIC_KEYS: [&str; 2] = [".ssh/id_rsa.pub", ".ssh/id_ed25519.pub"];

/// Home directory for AutoDeploy-internal paths
pub fn autodeploy_home_dir() -> Option<PathBuf> {
    std::env::var(AUTODEPLOY_TEST_HOME_VAR)
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// Expand a leading `~/` against [`autodeploy_home_dir`]
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => autodeploy_home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// Where a public key was found, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshKeySource {
    File(PathBuf),
    Placeholder,
}

/// Read the SSH public key to install on provisioned hosts
///
/// An explicit path wins; otherwise `~/.ssh/id_rsa.pub` then
/// `~/.ssh/id_ed25519.pub`. Falls back to a placeholder key so that
/// provisioning can still proceed (remote setup will then fail softly).
pub fn ssh_public_key(explicit: Option<&Path>) -> (String, SshKeySource) {
    let candidates: Vec<PathBuf> = match explicit {
        Some(path) => vec![expand_home(path)],
        None => autodeploy_home_dir()
            .map(|home| DEFAULT_PUBLIC_KEYS.iter().map(|p| home.join(p)).collect())
            .unwrap_or_default(),
    };
    for candidate in candidates {
        if let Ok(key) = std::fs::read_to_string(&candidate) {
            let key = key.trim();
            if !key.is_empty() {
                return (key.to_string(), SshKeySource::File(candidate));
            }
        }
    }
    (PLACEHOLDER_SSH_KEY.to_string(), SshKeySource::Placeholder)
}

/// Private key matching a public key path (`id_rsa.pub` -> `id_rsa`)
pub fn private_key_for(public: &Path) -> Option<PathBuf> {
    let name = public.file_name()?.to_str()?;
    let private = public.with_file_name(name.strip_suffix(".pub")?);
    private.is_file().then_some(private)
}
