//! Deploy Result
//!
//! Stage failures of the orchestrator. A run never returns these
//! directly; they end up as the error string of a failed record.

use thiserror::Error;

use crate::domain::ports::CommandError;
use crate::domain::value_objects::DeploymentType;
use crate::error::AutodeployError;
use crate::infrastructure::staging::StagingError;

#[derive(Debug, Error)]
pub enum DeployError {
    /// Topologies without a workload path; rejected before any stage runs
    #[error("'{0}' deployments are not supported: no workload path exists and provisioned infrastructure would be orphaned (use 'vm' or 'container')")]
    UnsupportedTopology(DeploymentType),

    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("build command '{command}' failed: {stderr}")]
    Build { command: String, stderr: String },

    #[error("failed to write container descriptor: {0}")]
    ContainerDescriptor(std::io::Error),

    #[error("infrastructure synthesis failed: {0}")]
    Synthesis(AutodeployError),

    #[error("terraform {step} failed: {stderr}")]
    Provision { step: &'static str, stderr: String },

    #[error("failed to read infrastructure outputs: {0}")]
    Outputs(String),

    #[error("container build failed: {0}")]
    ContainerBuild(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("deployment cancelled")]
    Cancelled,
}
