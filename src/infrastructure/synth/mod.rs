//! Infrastructure Code Synthesizer
//!
//! Renders an [`InfrastructurePlan`] into Terraform text artifacts. Each
//! conditional block is a [`Partial`]: a predicate over the plan plus a
//! renderer, evaluated in a fixed order. Synthesis performs no execution
//! and is idempotent: the same plan always yields byte-identical output.

mod aws;
mod azure;
pub mod dockerfile;
mod gcp;
pub mod scripts;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::entities::{ApplicationProfile, InfrastructurePlan};
use crate::domain::value_objects::CloudProvider;
use crate::error::AutodeployResult;
use crate::infrastructure::fs::write_atomic;

pub const MAIN_FILE: &str = "main.tf";
pub const VARIABLES_FILE: &str = "variables.tf";
pub const OUTPUTS_FILE: &str = "outputs.tf";
pub const USER_DATA_FILE: &str = "user_data.sh";

/// Inputs every partial may read
#[derive(Debug, Clone, Copy)]
pub struct SynthContext<'a> {
    pub plan: &'a InfrastructurePlan,
    pub profile: &'a ApplicationProfile,
}

/// One conditional block of a rendered file
pub struct Partial {
    pub name: &'static str,
    pub applies: fn(&SynthContext) -> bool,
    pub render: fn(&SynthContext) -> String,
}

impl Partial {
    /// Partial that is always rendered
    pub const fn always(name: &'static str, render: fn(&SynthContext) -> String) -> Self {
        Self {
            name,
            applies: always,
            render,
        }
    }
}

fn always(_: &SynthContext) -> bool {
    true
}

/// Render every applicable partial, in order, separated by blank lines
pub fn compose(partials: &[Partial], ctx: &SynthContext) -> String {
    let blocks: Vec<String> = partials
        .iter()
        .filter(|p| (p.applies)(ctx))
        .map(|p| {
            let mut block = (p.render)(ctx);
            if !block.ends_with('\n') {
                block.push('\n');
            }
            block
        })
        .collect();
    blocks.join("\n")
}

/// Names of the partials that apply to a context
pub fn applicable(partials: &[Partial], ctx: &SynthContext) -> Vec<&'static str> {
    partials
        .iter()
        .filter(|p| (p.applies)(ctx))
        .map(|p| p.name)
        .collect()
}

/// Replace `{{key}}` placeholders
pub(crate) fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{{}}}}}", key), value)
    })
}

/// One named text file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: &'static str,
    pub content: String,
}

/// Deterministic, ordered list of artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.content.as_str())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.artifacts.iter().map(|a| a.name).collect()
    }

    /// SHA-256 over names and contents, in order
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for artifact in &self.artifacts {
            hasher.update(artifact.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(artifact.content.as_bytes());
            hasher.update([0u8]);
        }
        format!("sha256:{:x}", hasher.finalize())
    }

    /// Write every artifact into `dir`, replacing existing files
    pub fn write_to(&self, dir: &Path) -> AutodeployResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = dir.join(artifact.name);
            write_atomic(&path, artifact.content.as_bytes())?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Renders plans into per-provider Terraform
#[derive(Debug, Default, Clone, Copy)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(
        &self,
        plan: &InfrastructurePlan,
        profile: &ApplicationProfile,
    ) -> ArtifactSet {
        let ctx = SynthContext { plan, profile };
        let mut artifacts = match plan.provider {
            CloudProvider::Aws => vec![
                artifact(MAIN_FILE, compose(aws::MAIN_PARTIALS, &ctx)),
                artifact(VARIABLES_FILE, aws::variables(&ctx)),
                artifact(OUTPUTS_FILE, compose(aws::OUTPUT_PARTIALS, &ctx)),
            ],
            CloudProvider::Gcp => vec![
                artifact(MAIN_FILE, gcp::main(&ctx)),
                artifact(VARIABLES_FILE, gcp::variables(&ctx)),
                artifact(OUTPUTS_FILE, gcp::outputs(&ctx)),
            ],
            CloudProvider::Azure => vec![
                artifact(MAIN_FILE, azure::main(&ctx)),
                artifact(VARIABLES_FILE, azure::variables(&ctx)),
                artifact(OUTPUTS_FILE, azure::outputs(&ctx)),
            ],
        };
        if plan.provider == CloudProvider::Aws {
            artifacts.push(artifact(USER_DATA_FILE, scripts::user_data(profile)));
        }
        ArtifactSet { artifacts }
    }

    /// Synthesize and write into `dir`
    pub fn synthesize_into(
        &self,
        plan: &InfrastructurePlan,
        profile: &ApplicationProfile,
        dir: &Path,
    ) -> AutodeployResult<ArtifactSet> {
        let set = self.synthesize(plan, profile);
        set.write_to(dir)?;
        Ok(set)
    }
}

fn artifact(name: &'static str, content: String) -> Artifact {
    Artifact { name, content }
}

/// Partial names the AWS main definition would render for a plan
pub fn aws_main_blocks(plan: &InfrastructurePlan, profile: &ApplicationProfile) -> Vec<&'static str> {
    applicable(aws::MAIN_PARTIALS, &SynthContext { plan, profile })
}
