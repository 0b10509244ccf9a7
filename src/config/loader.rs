//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AutodeployError, AutodeployResult};
use crate::infrastructure::fs::autodeploy_home_dir;

use super::types::{BackendKind, Config};

pub const PROJECT_CONFIG: &str = "autodeploy.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> AutodeployResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| AutodeployError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// First existing file of: explicit path, `./autodeploy.toml`, user config
///
/// An explicit path that does not exist is an error; the implicit
/// locations are simply skipped.
pub fn resolve(explicit: Option<&Path>) -> AutodeployResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => match candidate_files().into_iter().find(|p| p.is_file()) {
            Some(path) => load_with_warnings(&path)?,
            None => (Config::default(), Vec::new()),
        },
    };
    Ok((config.with_env_overrides(), warnings))
}

fn candidate_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(PROJECT_CONFIG)];
    if let Some(dir) = user_config_dir() {
        files.push(dir.join("autodeploy").join("config.toml"));
    }
    files
}

/// `$XDG_CONFIG_HOME`, else `~/.config`
fn user_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| autodeploy_home_dir().map(|h| h.join(".config")))
}

/// Apply environment overrides read through `lookup`
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(kind) = lookup("AUTODEPLOY_BACKEND") {
        match kind.parse::<BackendKind>() {
            Ok(kind) => config.backend.kind = kind,
            Err(err) => tracing::warn!("ignoring AUTODEPLOY_BACKEND: {}", err),
        }
    }
    if let Some(dir) = lookup("AUTODEPLOY_WORK_DIR") {
        config.deploy.work_dir = Some(PathBuf::from(dir));
    }
    if let Some(user) = lookup("AUTODEPLOY_SSH_USER") {
        config.deploy.ssh_user = user;
    }
    if let Some(bin) = lookup("AUTODEPLOY_TERRAFORM_BIN") {
        config.deploy.terraform_bin = bin;
    }
    if let Some(project) = lookup("GCP_PROJECT_ID") {
        config.gcp.project_id = Some(project);
    }
    config.backend.openai_api_key = lookup("OPENAI_API_KEY");
    config.backend.anthropic_api_key = lookup("ANTHROPIC_API_KEY");

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "backend",
        "kind",
        "model",
        "base_url",
        "timeout_secs",
        "deploy",
        "work_dir",
        "app_name_prefix",
        "ssh_user",
        "ssh_key_path",
        "terraform_bin",
        "settle_secs",
        "readiness_attempts",
        "readiness_delay_secs",
        "health_attempts",
        "health_delay_secs",
        "retry_attempts",
        "retry_delay_secs",
        "rewrite_localhost",
        "gcp",
        "project_id",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
