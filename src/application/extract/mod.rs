//! Signal Extractor
//!
//! Scans a repository tree and produces an [`ApplicationProfile`]. The scan
//! is deterministic and offline; unreadable or binary files lower the
//! confidence of the result instead of failing it.

mod index;
mod manifests;
mod scoring;
mod signals;

use std::path::Path;

use tracing::{debug, info};

use crate::domain::entities::{ApplicationProfile, ConfidenceSignals};
use crate::domain::value_objects::AppType;
use crate::error::AutodeployResult;

pub use index::{RepoIndex, IGNORE_FILE, MAX_TEXT_BYTES};
pub use manifests::{ManifestOutcome, Manifests, PackageJson};
pub use scoring::{detect_framework, framework_scores};
pub use signals::{is_config_like, SOURCE_EXTENSIONS};

/// Builds application profiles from repository trees
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalExtractor;

impl SignalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scan `root` and build its profile
    ///
    /// Fails only when `root` is not an existing directory.
    pub fn extract(&self, root: &Path) -> AutodeployResult<ApplicationProfile> {
        let index = RepoIndex::scan(root)?;
        info!(root = %root.display(), files = index.len(), "scanned repository");
        Ok(self.extract_from(&index))
    }

    /// Build a profile from an existing index
    pub fn extract_from(&self, index: &RepoIndex) -> ApplicationProfile {
        let language = signals::detect_language(index);
        let framework = detect_framework(index);
        let app_type = AppType::from_framework(framework);

        let manifests = Manifests::load(index);
        let dependencies = manifests.dependencies();
        let database_type = signals::detect_database(index, &dependencies);
        let requires_redis = signals::detect_redis(&dependencies);

        let port = signals::detect_port(index, framework);
        let entry_point = signals::entry_point(index, framework);
        let build_command = signals::build_command(framework);
        let start_command = signals::start_command(
            framework,
            entry_point.as_deref(),
            port,
            manifests.has_start_script(),
        );

        let confidence = ConfidenceSignals {
            category_known: app_type.is_known(),
            framework_known: framework.is_some(),
            entry_point_known: entry_point.is_some(),
            manifest_present: manifests.any_present(),
        }
        .score();

        let profile = ApplicationProfile {
            app_type,
            framework,
            language,
            dependencies,
            entry_point,
            build_command,
            start_command,
            port,
            environment_vars: signals::environment_variables(index),
            requires_database: database_type.is_some(),
            database_type,
            requires_redis,
            dockerfile_present: index.contains("Dockerfile"),
            docker_compose_present: index.contains("docker-compose.yml")
                || index.contains("docker-compose.yaml"),
            static_files: signals::has_static_assets(index),
            confidence_score: confidence,
        };

        debug!(
            framework = %profile.display_kind(),
            language = %profile.language,
            port = profile.port,
            database = ?profile.database_type,
            confidence = profile.confidence_score,
            "built application profile"
        );
        profile
    }
}
