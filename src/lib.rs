//! AutoDeploy - repository plus plain-language intent to running infrastructure
//!
//! Five stages, each a separate module:
//! signal extraction, intent interpretation, policy decision,
//! infrastructure code synthesis, and deployment orchestration.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{AnalysisReport, AnalysisUseCase, DeployOptions, DeployUseCase};
pub use config::Config;
pub use domain::entities::{
    ApplicationProfile, DeploymentRecord, DeploymentRequirements, InfrastructurePlan,
};
pub use domain::value_objects::{CloudProvider, DeploymentId, RepoSource};
pub use error::{AutodeployError, AutodeployResult};
