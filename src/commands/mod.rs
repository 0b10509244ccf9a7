//! Command handlers
//!
//! Each handler parses its inputs, runs one use case, and renders the
//! result as text or JSON.

pub mod analyze;
pub mod deploy;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autodeploy::application::local_root;
use autodeploy::domain::ports::CommandRunner;
use autodeploy::{CloudProvider, Config, RepoSource};

/// Flags shared by every command plus the resolved configuration
pub struct CommandContext {
    pub json: bool,
    pub provider: Option<CloudProvider>,
    pub config: Config,
}

/// Parse the repository argument and produce a local root to scan
///
/// Remote and archive sources are staged into `scratch`.
pub fn prepare_repository(
    runner: &dyn CommandRunner,
    repo: &str,
    scratch: &Path,
) -> Result<(RepoSource, PathBuf)> {
    let source = RepoSource::parse(repo)?;
    let root = local_root(runner, &source, scratch)
        .with_context(|| format!("failed to stage {}", source.describe()))?;
    Ok((source, root))
}
