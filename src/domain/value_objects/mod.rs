//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod cloud_provider;
mod database_kind;
mod deployment_id;
mod deployment_type;
mod framework;
mod language;
mod repo_source;

pub use cloud_provider::CloudProvider;
pub use database_kind::{DatabaseKind, REDIS_KEYWORDS};
pub use deployment_id::DeploymentId;
pub use deployment_type::DeploymentType;
pub use framework::{AppType, Framework};
pub use language::Language;
pub use repo_source::{ArchiveFormat, RepoSource};
