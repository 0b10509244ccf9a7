//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AutodeployResult;

use super::loader::{self, ConfigWarning};

/// Which natural-language backend the interpreter may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// First backend with an API key, else rule-based only
    #[default]
    Auto,
    Openai,
    Anthropic,
    /// Rule-based interpretation only
    None,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "openai" => Ok(BackendKind::Openai),
            "anthropic" => Ok(BackendKind::Anthropic),
            "none" | "off" | "rules" => Ok(BackendKind::None),
            other => Err(format!(
                "unknown backend '{}' (expected auto, openai, anthropic, or none)",
                other
            )),
        }
    }
}

/// Natural-language backend settings
///
/// API keys only come from the environment and are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    #[serde(skip)]
    pub openai_api_key: Option<String>,

    #[serde(skip)]
    pub anthropic_api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            model: None,
            base_url: None,
            timeout_secs: default_backend_timeout(),
            openai_api_key: None,
            anthropic_api_key: None,
        }
    }
}

fn default_backend_timeout() -> u64 {
    30
}

/// Orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Root for per-run working directories (default `<tmp>/autodeploy`)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    #[serde(default = "default_prefix")]
    pub app_name_prefix: String,

    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,

    /// Public key to install on hosts (default `~/.ssh/id_rsa.pub`, then ed25519)
    #[serde(default)]
    pub ssh_key_path: Option<PathBuf>,

    #[serde(default = "default_terraform_bin")]
    pub terraform_bin: String,

    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    #[serde(default = "default_readiness_attempts")]
    pub readiness_attempts: u32,

    #[serde(default = "default_readiness_delay")]
    pub readiness_delay_secs: u64,

    #[serde(default = "default_health_attempts")]
    pub health_attempts: u32,

    #[serde(default = "default_health_delay")]
    pub health_delay_secs: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    #[serde(default)]
    pub rewrite_localhost: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            app_name_prefix: default_prefix(),
            ssh_user: default_ssh_user(),
            ssh_key_path: None,
            terraform_bin: default_terraform_bin(),
            settle_secs: default_settle_secs(),
            readiness_attempts: default_readiness_attempts(),
            readiness_delay_secs: default_readiness_delay(),
            health_attempts: default_health_attempts(),
            health_delay_secs: default_health_delay(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay(),
            rewrite_localhost: false,
        }
    }
}

impl DeployConfig {
    pub fn work_root(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("autodeploy"))
    }
}

fn default_prefix() -> String {
    "ad".to_string()
}

fn default_ssh_user() -> String {
    "ubuntu".to_string()
}

fn default_terraform_bin() -> String {
    "terraform".to_string()
}

fn default_settle_secs() -> u64 {
    30
}

fn default_readiness_attempts() -> u32 {
    20
}

fn default_readiness_delay() -> u64 {
    15
}

fn default_health_attempts() -> u32 {
    5
}

fn default_health_delay() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

/// GCP inputs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GcpConfig {
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub gcp: GcpConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> AutodeployResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> AutodeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Explicit path, project file, user file, or defaults; then environment
    pub fn resolve(explicit: Option<&Path>) -> AutodeployResult<(Self, Vec<ConfigWarning>)> {
        loader::resolve(explicit)
    }

    /// Apply environment variable overrides (AUTODEPLOY_* prefix and API keys)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }
}
