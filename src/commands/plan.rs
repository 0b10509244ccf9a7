//! `plan` - dry run down to infrastructure code

use std::path::Path;

use anyhow::{Context, Result};
use autodeploy::application::validate_description;
use autodeploy::infrastructure::run_output::{write_json, ANALYSIS_FILE};
use autodeploy::infrastructure::{Synthesizer, SystemCommandRunner};
use autodeploy::presentation::factory::create_analysis_use_case;
use serde_json::json;

use super::{prepare_repository, CommandContext};
use crate::ui::json::emit;
use crate::ui::views::{render_artifacts, render_plan, render_profile, render_requirements};

/// Subdirectory of the output directory holding the infrastructure code
pub const TERRAFORM_DIR: &str = "terraform";

pub fn cmd_plan(ctx: &CommandContext, repo: &str, description: &str, output_dir: &Path) -> Result<()> {
    let description = validate_description(description)?;
    let scratch = tempfile::tempdir()?;
    let (_, root) = prepare_repository(&SystemCommandRunner::new(), repo, scratch.path())?;

    let report = create_analysis_use_case(&ctx.config.backend).analyze(
        &root,
        description,
        ctx.provider,
    )?;

    let analysis_path = write_json(output_dir, ANALYSIS_FILE, &report)
        .with_context(|| format!("failed to write {}", output_dir.display()))?;
    let terraform_dir = output_dir.join(TERRAFORM_DIR);
    let artifacts = Synthesizer::new().synthesize(&report.plan, &report.profile);
    let files = artifacts.write_to(&terraform_dir)?;

    if ctx.json {
        emit(json!({
            "event": "plan",
            "analysis": report,
            "analysis_file": analysis_path,
            "artifacts_dir": terraform_dir,
            "artifacts": artifacts.names(),
            "digest": artifacts.digest(),
        }))?;
        return Ok(());
    }

    print!("{}", render_profile(&report.profile));
    println!();
    print!("{}", render_requirements(&report.requirements));
    println!();
    print!("{}", render_plan(&report.plan));
    println!();
    print!("{}", render_artifacts(&terraform_dir, &files));
    println!("Analysis written to {}", analysis_path.display());
    Ok(())
}
