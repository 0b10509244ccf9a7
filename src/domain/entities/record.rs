//! Deployment record entity
//!
//! A record is created at orchestration start as a [`RecordBuilder`],
//! appended to throughout the run, and finalized exactly once: the
//! finishing methods consume the builder, so a returned
//! [`DeploymentRecord`] cannot be mutated afterward.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::DeploymentId;

/// Final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Success,
    Failed,
    Cancelled,
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentStatus::Success => f.write_str("success"),
            DeploymentStatus::Failed => f.write_str("failed"),
            DeploymentStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Workload target a successful run deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Vm,
    Container,
}

/// Provider-specific address of the deployed workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Addressing {
    InstanceIp(String),
    LoadBalancerDns(String),
}

impl Addressing {
    pub fn host(&self) -> &str {
        match self {
            Addressing::InstanceIp(host) | Addressing::LoadBalancerDns(host) => host,
        }
    }
}

/// Success details of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentInfo {
    pub target: TargetKind,
    pub url: Option<String>,
    pub port: u16,
    pub addressing: Option<Addressing>,
    /// Local container image tag (container path only)
    pub image: Option<String>,
}

/// Finalized, immutable record of one orchestration run
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRecord {
    deployment_id: DeploymentId,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    status: DeploymentStatus,
    logs: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<DeploymentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DeploymentRecord {
    pub fn deployment_id(&self) -> &DeploymentId {
        &self.deployment_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Success
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn info(&self) -> Option<&DeploymentInfo> {
        self.info.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// In-progress record, owned by one orchestration run
#[derive(Debug)]
pub struct RecordBuilder {
    deployment_id: DeploymentId,
    started_at: DateTime<Utc>,
    logs: Vec<String>,
    warnings: Vec<String>,
}

impl RecordBuilder {
    pub fn start(deployment_id: DeploymentId) -> Self {
        Self {
            deployment_id,
            started_at: Utc::now(),
            logs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn deployment_id(&self) -> &DeploymentId {
        &self.deployment_id
    }

    /// Append a stage message
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    /// Append a soft failure; it is logged and kept in the warning list
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.logs.push(format!("WARNING: {}", message));
        self.warnings.push(message);
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn finish_success(self, info: DeploymentInfo) -> DeploymentRecord {
        self.finish(DeploymentStatus::Success, Some(info), None)
    }

    /// Finalize as failed; the error becomes the last log line
    pub fn fail(mut self, error: impl Into<String>) -> DeploymentRecord {
        let error = error.into();
        self.logs.push(format!("ERROR: {}", error));
        self.finish(DeploymentStatus::Failed, None, Some(error))
    }

    pub fn cancel(mut self) -> DeploymentRecord {
        let message = "deployment cancelled by user".to_string();
        self.logs.push(message.clone());
        self.finish(DeploymentStatus::Cancelled, None, Some(message))
    }

    fn finish(
        self,
        status: DeploymentStatus,
        info: Option<DeploymentInfo>,
        error: Option<String>,
    ) -> DeploymentRecord {
        DeploymentRecord {
            deployment_id: self.deployment_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            status,
            logs: self.logs,
            warnings: self.warnings,
            info,
            error,
        }
    }
}
