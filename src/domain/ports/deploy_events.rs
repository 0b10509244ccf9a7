//! Deploy Event Port
//!
//! Observable progress for the orchestrator. The record's own log is the
//! durable trail; events are only for live progress display.

use std::fmt;

/// Orchestrator stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stage,
    Build,
    ContainerDescriptor,
    Synthesize,
    Provision,
    Outputs,
    Workload,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Stage,
        Stage::Build,
        Stage::ContainerDescriptor,
        Stage::Synthesize,
        Stage::Provision,
        Stage::Outputs,
        Stage::Workload,
        Stage::Verify,
    ];

    /// 1-based position in the pipeline
    pub fn position(&self) -> usize {
        Stage::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Stage => "Staging repository",
            Stage::Build => "Building application",
            Stage::ContainerDescriptor => "Preparing container descriptor",
            Stage::Synthesize => "Synthesizing infrastructure code",
            Stage::Provision => "Provisioning infrastructure",
            Stage::Outputs => "Reading infrastructure outputs",
            Stage::Workload => "Deploying application",
            Stage::Verify => "Verifying deployment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Event emitted during a deployment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    Started { deployment_id: String },
    StageStarted { stage: Stage },
    StageSkipped { stage: Stage, reason: String },
    Warning { message: String },
    Finished { status: String },
}

/// Trait for receiving deploy events
pub trait DeployEventSink: Send + Sync {
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}
