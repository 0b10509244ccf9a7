//! `deploy` - live run

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use autodeploy::application::deploy::check_topology;
use autodeploy::application::{validate_description, AnalysisReport, CancelToken, DeployOptions};
use autodeploy::domain::entities::DeploymentStatus;
use autodeploy::infrastructure::run_output::{deployment_file_name, write_json, ANALYSIS_FILE};
use autodeploy::infrastructure::SystemCommandRunner;
use autodeploy::presentation::factory::{create_analysis_use_case, create_deploy_use_case};
use autodeploy::{DeploymentId, RepoSource};
use dialoguer::Confirm;
use is_terminal::IsTerminal;
use tracing::warn;

use super::{prepare_repository, CommandContext};
use crate::ui::json::{emit, tagged};
use crate::ui::progress::ProgressSink;
use crate::ui::views::{render_plan, render_profile, render_record, render_requirements};

pub fn cmd_deploy(
    ctx: &CommandContext,
    repo: &str,
    description: &str,
    output_dir: &Path,
    deployment_id: Option<DeploymentId>,
    yes: bool,
) -> Result<()> {
    let description = validate_description(description)?;
    let id = deployment_id.unwrap_or_else(DeploymentId::generate);
    let work_root = ctx.config.deploy.work_root();
    let run_dir = work_root.join(id.as_str());
    let scratch = run_dir.join("source");

    let (root, report) = match plan_staged(ctx, repo, description, &scratch) {
        Ok(planned) => planned,
        Err(err) => {
            discard_staged(&run_dir, &scratch);
            return Err(err);
        }
    };
    write_json(output_dir, ANALYSIS_FILE, &report)
        .with_context(|| format!("failed to write {}", output_dir.display()))?;

    if ctx.json {
        emit(tagged("plan", "plan", &report.plan))?;
    } else {
        print!("{}", render_profile(&report.profile));
        println!();
        print!("{}", render_requirements(&report.requirements));
        println!();
        print!("{}", render_plan(&report.plan));
        println!();
    }

    if !yes {
        let confirmed = confirm(&report.plan.estimated_cost);
        if !matches!(confirmed, Ok(true)) {
            discard_staged(&run_dir, &scratch);
            if !confirmed? {
                if !ctx.json {
                    println!("Aborted; nothing was provisioned.");
                }
                return Ok(());
            }
        }
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %err, "could not install Ctrl-C handler");
    }

    let events = Arc::new(ProgressSink::new(ctx.json));
    let use_case = create_deploy_use_case(events, cancel)?;
    let options = DeployOptions::from_config(
        RepoSource::Directory { path: root },
        &ctx.config.deploy,
        &ctx.config.gcp,
    )
    .with_work_root(work_root)
    .with_deployment_id(Some(id.clone()));

    let record = use_case.execute(&options, &report.profile, &report.plan);
    let record_path = write_json(output_dir, &deployment_file_name(&id), &record)?;

    if ctx.json {
        emit(tagged("complete", "record", &record))?;
    } else {
        print!("{}", render_record(&record));
        println!("Record written to {}", record_path.display());
    }

    match record.status() {
        DeploymentStatus::Success => Ok(()),
        DeploymentStatus::Cancelled => bail!("deployment {} cancelled", id),
        DeploymentStatus::Failed => bail!(
            "deployment {} failed: {}",
            id,
            record.error().unwrap_or("unknown error")
        ),
    }
}

/// Stage the source, analyze it, and reject plans with no workload path
fn plan_staged(
    ctx: &CommandContext,
    repo: &str,
    description: &str,
    scratch: &Path,
) -> Result<(PathBuf, AnalysisReport)> {
    let (_, root) = prepare_repository(&SystemCommandRunner::new(), repo, scratch)?;
    let report = create_analysis_use_case(&ctx.config.backend).analyze(
        &root,
        description,
        ctx.provider,
    )?;
    check_topology(&report.plan)?;
    Ok((root, report))
}

/// Remove a staged source tree; the run directory goes only if nothing else is in it
fn discard_staged(run_dir: &Path, scratch: &Path) {
    if !scratch.exists() {
        return;
    }
    if let Err(err) = std::fs::remove_dir_all(scratch) {
        warn!(path = %scratch.display(), error = %err, "could not remove staged source");
        return;
    }
    let _ = std::fs::remove_dir(run_dir);
}

/// Interactive confirmation; refuses to guess in non-interactive sessions
fn confirm(cost: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("refusing to provision infrastructure without confirmation; pass --yes");
    }
    let answer = Confirm::new()
        .with_prompt(format!("Provision this infrastructure ({})?", cost))
        .default(false)
        .interact()?;
    Ok(answer)
}
