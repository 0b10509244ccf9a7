//! Infra-as-code tool invocation
//!
//! Builds the `init` / `plan` / `apply` / `output` command lines and
//! interprets their results. Execution goes through a `CommandRunner`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::{CommandOutput, CommandSpec};
use crate::domain::value_objects::CloudProvider;

pub const DEFAULT_BIN: &str = "terraform";
pub const PLAN_FILE: &str = "tfplan";

/// `plan -detailed-exitcode`: 0 = no changes, 2 = changes present
const PLAN_CHANGES_EXIT: i32 = 2;

const AWS_ENV: [&str; 6] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_PROFILE",
    "AWS_REGION",
    "AWS_DEFAULT_REGION",
];
const GCP_ENV: [&str; 2] = ["GOOGLE_APPLICATION_CREDENTIALS", "GOOGLE_PROJECT"];
const AZURE_ENV: [&str; 4] = [
    "ARM_CLIENT_ID",
    "ARM_CLIENT_SECRET",
    "ARM_SUBSCRIPTION_ID",
    "ARM_TENANT_ID",
];

/// Named `-var` values for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerraformVars(Vec<(String, String)>);

impl TerraformVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    pub fn merge(mut self, other: TerraformVars) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn to_args(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(k, v)| ["-var".to_string(), format!("{}={}", k, v)])
            .collect()
    }
}

/// Provider-specific variables: region plus project for GCP
pub fn provider_variables(
    provider: CloudProvider,
    region: &str,
    gcp_project: Option<&str>,
) -> TerraformVars {
    match provider {
        CloudProvider::Aws => TerraformVars::new().set("aws_region", region),
        CloudProvider::Gcp => TerraformVars::new()
            .set("gcp_project_id", gcp_project.unwrap_or_default())
            .set("gcp_region", region),
        CloudProvider::Azure => TerraformVars::new().set("azure_location", region),
    }
}

/// Credential environment forwarded to the tool for a provider
pub fn credential_env<F>(provider: CloudProvider, lookup: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let names: &[&str] = match provider {
        CloudProvider::Aws => &AWS_ENV,
        CloudProvider::Gcp => &GCP_ENV,
        CloudProvider::Azure => &AZURE_ENV,
    };
    names
        .iter()
        .filter_map(|name| lookup(name).map(|value| (name.to_string(), value)))
        .collect()
}

/// Command builder bound to one working directory
#[derive(Debug, Clone)]
pub struct Terraform {
    bin: String,
    dir: PathBuf,
    env: Vec<(String, String)>,
}

impl Terraform {
    pub fn new(bin: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        Self {
            bin: bin.into(),
            dir: dir.as_ref().to_path_buf(),
            env: vec![("TF_IN_AUTOMATION".to_string(), "1".to_string())],
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    fn command(&self, subcommand: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.bin)
            .arg(subcommand)
            .current_dir(&self.dir);
        for (k, v) in &self.env {
            spec = spec.env(k, v);
        }
        spec
    }

    pub fn init(&self) -> CommandSpec {
        self.command("init").args(["-input=false", "-no-color"])
    }

    pub fn plan(&self, vars: &TerraformVars) -> CommandSpec {
        self.command("plan")
            .args(["-input=false", "-no-color", "-detailed-exitcode"])
            .arg(format!("-out={}", PLAN_FILE))
            .args(vars.to_args())
    }

    pub fn apply(&self) -> CommandSpec {
        self.command("apply")
            .args(["-input=false", "-no-color", "-auto-approve", PLAN_FILE])
    }

    pub fn output(&self) -> CommandSpec {
        self.command("output").arg("-json")
    }
}

/// `plan` succeeded with or without pending changes
pub fn plan_succeeded(output: &CommandOutput) -> bool {
    matches!(output.code, Some(0) | Some(PLAN_CHANGES_EXIT))
}

#[derive(Debug, Deserialize)]
struct OutputEntry {
    value: Value,
}

/// Parse `output -json` into name -> value
pub fn parse_outputs(json: &str) -> Result<BTreeMap<String, Value>, serde_json::Error> {
    if json.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let entries: BTreeMap<String, OutputEntry> = serde_json::from_str(json)?;
    Ok(entries.into_iter().map(|(k, e)| (k, e.value)).collect())
}

/// String value of an output, if present and non-empty
pub fn output_str<'a>(outputs: &'a BTreeMap<String, Value>, name: &str) -> Option<&'a str> {
    outputs
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
