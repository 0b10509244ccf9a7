//! Deploy Options
//!
//! Configuration types for one orchestration run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{DeployConfig, GcpConfig};
use crate::domain::value_objects::{DeploymentId, RepoSource};

/// Waits and retry bounds
///
/// Every polling loop is bounded: the longest it can wait is
/// `attempts * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle: Duration,
    pub readiness_attempts: u32,
    pub readiness_delay: Duration,
    pub health_attempts: u32,
    pub health_delay: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Timing {
    /// No waiting at all; attempt counts are kept
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            readiness_delay: Duration::ZERO,
            health_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Upper bound of the host readiness poll
    pub fn readiness_bound(&self) -> Duration {
        self.readiness_delay * self.readiness_attempts
    }

    /// Upper bound of the health verification poll
    pub fn health_bound(&self) -> Duration {
        self.health_delay * self.health_attempts
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&DeployConfig::default())
    }
}

impl From<&DeployConfig> for Timing {
    fn from(config: &DeployConfig) -> Self {
        Self {
            settle: Duration::from_secs(config.settle_secs),
            readiness_attempts: config.readiness_attempts.max(1),
            readiness_delay: Duration::from_secs(config.readiness_delay_secs),
            health_attempts: config.health_attempts.max(1),
            health_delay: Duration::from_secs(config.health_delay_secs),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// Shared cancellation flag, set from a signal handler
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Where the application source comes from
    pub source: RepoSource,
    /// Caller-provided identity; generated when absent
    pub deployment_id: Option<DeploymentId>,
    /// Parent of the per-run working directory
    pub work_root: PathBuf,
    pub app_name_prefix: String,
    pub ssh_user: String,
    pub ssh_key_path: Option<PathBuf>,
    pub terraform_bin: String,
    pub gcp_project: Option<String>,
    pub rewrite_localhost: bool,
    pub timing: Timing,
}

impl DeployOptions {
    pub fn new(source: RepoSource, work_root: impl Into<PathBuf>) -> Self {
        Self::from_config(source, &DeployConfig::default(), &GcpConfig::default())
            .with_work_root(work_root)
    }

    pub fn from_config(source: RepoSource, deploy: &DeployConfig, gcp: &GcpConfig) -> Self {
        Self {
            source,
            deployment_id: None,
            work_root: deploy.work_root(),
            app_name_prefix: deploy.app_name_prefix.clone(),
            ssh_user: deploy.ssh_user.clone(),
            ssh_key_path: deploy.ssh_key_path.clone(),
            terraform_bin: deploy.terraform_bin.clone(),
            gcp_project: gcp.project_id.clone(),
            rewrite_localhost: deploy.rewrite_localhost,
            timing: Timing::from(deploy),
        }
    }

    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = root.into();
        self
    }

    pub fn with_deployment_id(mut self, id: Option<DeploymentId>) -> Self {
        self.deployment_id = id;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_ssh_key_path(mut self, path: Option<PathBuf>) -> Self {
        self.ssh_key_path = path;
        self
    }
}
