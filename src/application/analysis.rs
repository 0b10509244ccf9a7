//! Analysis Use Case
//!
//! The offline half of the pipeline: extract a profile, interpret the
//! description, decide a plan. Nothing is provisioned; `plan` and `deploy`
//! both start here.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::application::extract::SignalExtractor;
use crate::application::interpret::{validate_description, IntentInterpreter};
use crate::domain::entities::{ApplicationProfile, DeploymentRequirements, InfrastructurePlan};
use crate::domain::ports::CommandRunner;
use crate::domain::services::PolicyEngine;
use crate::domain::value_objects::{CloudProvider, RepoSource};
use crate::error::AutodeployResult;
use crate::infrastructure::staging::{self, StagingError};

/// Everything decided before any infrastructure exists
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub profile: ApplicationProfile,
    pub requirements: DeploymentRequirements,
    pub plan: InfrastructurePlan,
}

pub struct AnalysisUseCase {
    extractor: SignalExtractor,
    interpreter: IntentInterpreter,
    policy: PolicyEngine,
}

impl AnalysisUseCase {
    pub fn new(interpreter: IntentInterpreter) -> Self {
        Self {
            extractor: SignalExtractor::new(),
            interpreter,
            policy: PolicyEngine::new(),
        }
    }

    /// Profile only (the `analyze` command)
    pub fn profile(&self, root: &Path) -> AutodeployResult<ApplicationProfile> {
        self.extractor.extract(root)
    }

    /// Full dry run over a local repository root
    ///
    /// The description is validated before the repository is scanned. An
    /// explicit provider replaces whatever the description implied.
    pub fn analyze(
        &self,
        root: &Path,
        description: &str,
        provider: Option<CloudProvider>,
    ) -> AutodeployResult<AnalysisReport> {
        let description = validate_description(description)?;
        let profile = self.extractor.extract(root)?;

        let mut requirements = self.interpreter.interpret(description, &profile);
        if let Some(provider) = provider {
            requirements = requirements.with_cloud_provider(provider);
        }
        let plan = self.policy.decide(&profile, &requirements);
        info!(
            provider = %plan.provider,
            strategy = %plan.deployment_strategy,
            cost = %plan.estimated_cost,
            "planned deployment"
        );

        Ok(AnalysisReport {
            profile,
            requirements,
            plan,
        })
    }
}

/// Local root to scan for a source
///
/// Directories are scanned in place; remotes and archives are staged into
/// `scratch` first.
pub fn local_root(
    runner: &dyn CommandRunner,
    source: &RepoSource,
    scratch: &Path,
) -> Result<PathBuf, StagingError> {
    match source {
        RepoSource::Directory { path } => Ok(path.clone()),
        _ => staging::stage(runner, source, scratch),
    }
}
