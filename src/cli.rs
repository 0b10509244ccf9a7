use std::path::PathBuf;

use autodeploy::{CloudProvider, DeploymentId};
use clap::{Parser, Subcommand};

/// Default directory for plan artifacts and run records
pub const DEFAULT_OUTPUT_DIR: &str = "autodeploy-output";

/// AutoDeploy - deploy a repository from a plain-language description
#[derive(Parser, Debug)]
#[command(name = "autodeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable output (one JSON object per line)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Cloud provider, overriding whatever the description implies
    #[arg(long, global = true)]
    pub provider: Option<CloudProvider>,

    /// Configuration file (default: ./autodeploy.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a repository and print its application profile
    Analyze {
        /// Git URL, local directory, or .zip/.tar.gz/.tgz/.tar archive
        repo: String,
    },

    /// Dry run: profile, requirements, plan and infrastructure code
    Plan {
        /// Git URL, local directory, or .zip/.tar.gz/.tgz/.tar archive
        #[arg(short, long)]
        repo: String,

        /// What you want, e.g. "small VM on AWS with a postgres database"
        #[arg(short, long)]
        description: String,

        /// Where analysis.json and the infrastructure code are written
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Provision infrastructure and deploy the application
    Deploy {
        /// Git URL, local directory, or .zip/.tar.gz/.tgz/.tar archive
        #[arg(short, long)]
        repo: String,

        /// What you want, e.g. "small VM on AWS with a postgres database"
        #[arg(short, long)]
        description: String,

        /// Where analysis.json and the deployment record are written
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Reuse a specific deployment identity instead of generating one
        #[arg(long)]
        deployment_id: Option<DeploymentId>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deploy_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "autodeploy",
            "deploy",
            "--repo",
            "https://github.com/acme/shop",
            "--description",
            "small vm please",
            "--provider",
            "gcp",
            "--yes",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.provider, Some(CloudProvider::Gcp));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Deploy {
                yes,
                output_dir,
                deployment_id,
                ..
            } => {
                assert!(yes);
                assert_eq!(output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
                assert!(deployment_id.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = Cli::try_parse_from(["autodeploy", "--provider", "heroku", "analyze", "."])
            .unwrap_err();
        assert!(err.to_string().contains("heroku"));
    }

    #[test]
    fn rejects_malformed_deployment_id() {
        let result = Cli::try_parse_from([
            "autodeploy",
            "deploy",
            "-r",
            ".",
            "-d",
            "small vm please",
            "--deployment-id",
            "Not Valid",
        ]);
        assert!(result.is_err());
    }
}
