//! AutoDeploy CLI - repository plus plain-language intent to a running deployment
//!
//! Usage: autodeploy <COMMAND>
//!
//! Commands:
//!   analyze  Scan a repository and print its application profile
//!   plan     Dry run: profile, requirements, plan and infrastructure code
//!   deploy   Provision infrastructure and deploy the application

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use autodeploy::Config;
use cli::{Cli, Commands};
use commands::CommandContext;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, warnings) = Config::resolve(cli.config.as_deref())?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    let ctx = CommandContext {
        json: cli.json,
        provider: cli.provider,
        config,
    };

    match cli.command {
        Commands::Analyze { repo } => commands::analyze::cmd_analyze(&ctx, &repo),
        Commands::Plan {
            repo,
            description,
            output_dir,
        } => commands::plan::cmd_plan(&ctx, &repo, &description, &output_dir),
        Commands::Deploy {
            repo,
            description,
            output_dir,
            deployment_id,
            yes,
        } => commands::deploy::cmd_deploy(
            &ctx,
            &repo,
            &description,
            &output_dir,
            deployment_id,
            yes,
        ),
    }
}

/// `-v` count picks the default level; `RUST_LOG` wins when set
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("autodeploy={level},warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
