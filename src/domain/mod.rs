//! Domain Layer
//!
//! The decision core of AutoDeploy - pure logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Pipeline records (ApplicationProfile, DeploymentRequirements,
//!   InfrastructurePlan, DeploymentRecord)
//! - `value_objects/` - Immutable value types (CloudProvider, Framework, DeploymentId)
//! - `services/` - Decision services (PolicyEngine, RuleInterpreter, CostModel)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system, processes, or network
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
