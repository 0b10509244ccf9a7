//! Domain Ports (Interfaces)
//!
//! These traits define the I/O boundaries of the pipeline.
//! Infrastructure layer provides concrete implementations.

pub mod command_runner;
pub mod deploy_events;
pub mod health_probe;
pub mod language_backend;

pub use command_runner::{CommandError, CommandOutput, CommandRunner, CommandSpec};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink, Stage};
pub use health_probe::{HealthProbe, ProbeError};
pub use language_backend::{BackendError, LanguageBackend};
