//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::Arc;

use crate::application::interpret::IntentInterpreter;
use crate::application::{AnalysisUseCase, CancelToken, DeployUseCase};
use crate::config::BackendConfig;
use crate::domain::ports::{DeployEventSink, ProbeError};
use crate::infrastructure::{llm, HttpHealthProbe, SystemCommandRunner};

/// Type alias for the concrete DeployUseCase with all dependencies
pub type ConcreteDeployUseCase = DeployUseCase<SystemCommandRunner, HttpHealthProbe>;

/// Analysis with the configured natural-language backend, if any
pub fn create_analysis_use_case(backend: &BackendConfig) -> AnalysisUseCase {
    AnalysisUseCase::new(IntentInterpreter::from_backend(llm::from_config(backend)))
}

/// Create a deploy use case with all dependencies wired up
pub fn create_deploy_use_case(
    events: Arc<dyn DeployEventSink>,
    cancel: CancelToken,
) -> Result<ConcreteDeployUseCase, ProbeError> {
    Ok(
        DeployUseCase::new(SystemCommandRunner::new(), HttpHealthProbe::new()?)
            .with_events(events)
            .with_cancel_token(cancel),
    )
}
