//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `SignalExtractor` - Repository tree to application profile
//! - `IntentInterpreter` - Description to deployment requirements
//! - `AnalysisUseCase` - Profile, requirements and plan without side effects
//! - `DeployUseCase` - Orchestrates a live deployment run

pub mod analysis;
pub mod deploy;
pub mod extract;
pub mod interpret;

pub use analysis::{local_root, AnalysisReport, AnalysisUseCase};
pub use deploy::{CancelToken, DeployError, DeployOptions, DeployUseCase, Timing};
pub use extract::SignalExtractor;
pub use interpret::{validate_description, IntentInterpreter, MIN_DESCRIPTION_CHARS};
