//! Domain Entities
//!
//! The four records that flow through the pipeline, one per stage:
//! - `ApplicationProfile` - what the repository needs
//! - `DeploymentRequirements` - what the user asked for
//! - `InfrastructurePlan` - what will be provisioned
//! - `DeploymentRecord` - what happened

mod plan;
mod profile;
mod record;
mod requirements;

pub use plan::{
    AuxiliaryService, ComputeResources, DatabasePlan, DatabaseSpec, InfrastructurePlan,
    Networking, Storage,
};
pub use profile::{ApplicationProfile, ConfidenceSignals};
pub use record::{
    Addressing, DeploymentInfo, DeploymentRecord, DeploymentStatus, RecordBuilder, TargetKind,
};
pub use requirements::{DeploymentRequirements, RequirementsDraft, ScalingPolicy};
