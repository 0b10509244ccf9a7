//! Deployment requirements entity
//!
//! Structured summary of a user's stated deployment intent. Both invariants
//! (`max >= min`, `custom_domain => ssl_required`) are enforced by
//! construction: the only ways in are [`DeploymentRequirements::new`] and
//! deserialization, and both pass through the same normalization.
//!
//! Region and instance type end up inside generated infrastructure code, so
//! anything outside a conservative charset is dropped and the provider
//! defaults apply.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CloudProvider, DeploymentType};

static SETTING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 ._-]{1,64}$").expect("setting pattern is valid"));

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.-]{1,253}$").expect("domain pattern is valid"));

/// Trimmed value if it is safe to place in a provider setting
fn provider_setting(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| SETTING_RE.is_match(v))
}

/// Instance-count bounds and auto-scaling switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScalingDraft")]
pub struct ScalingPolicy {
    min: u32,
    max: u32,
    auto: bool,
}

#[derive(Deserialize)]
struct ScalingDraft {
    #[serde(default = "one")]
    min: u32,
    #[serde(default = "one")]
    max: u32,
    #[serde(default)]
    auto: bool,
}

fn one() -> u32 {
    1
}

impl From<ScalingDraft> for ScalingPolicy {
    fn from(draft: ScalingDraft) -> Self {
        ScalingPolicy::new(draft.min, draft.max, draft.auto)
    }
}

impl ScalingPolicy {
    /// Build a policy, repairing out-of-range bounds
    ///
    /// `min` is raised to at least 1 and `max` to at least `min`.
    pub fn new(min: u32, max: u32, auto: bool) -> Self {
        let min = min.max(1);
        let max = max.max(min);
        Self { min, max, auto }
    }

    /// One fixed instance
    pub fn fixed() -> Self {
        Self::new(1, 1, false)
    }

    /// The rule-based interpreter's auto-scaling default
    pub fn autoscaling() -> Self {
        Self::new(1, 3, true)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn auto(&self) -> bool {
        self.auto
    }

    /// More than one instance may run at once
    pub fn needs_load_balancer(&self) -> bool {
        self.auto || self.max > 1
    }
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Unvalidated requirement fields, as produced by an interpreter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequirementsDraft {
    #[serde(default)]
    pub cloud_provider: CloudProvider,
    #[serde(default)]
    pub deployment_type: DeploymentType,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub scaling: ScalingPolicy,
    #[serde(default)]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub ssl_required: bool,
    #[serde(default)]
    pub additional_services: Vec<String>,
    #[serde(default)]
    pub raw_description: String,
}

/// Validated deployment requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RequirementsDraft")]
pub struct DeploymentRequirements {
    cloud_provider: CloudProvider,
    deployment_type: DeploymentType,
    region: Option<String>,
    instance_type: Option<String>,
    scaling: ScalingPolicy,
    custom_domain: Option<String>,
    ssl_required: bool,
    additional_services: Vec<String>,
    raw_description: String,
}

impl From<RequirementsDraft> for DeploymentRequirements {
    fn from(draft: RequirementsDraft) -> Self {
        DeploymentRequirements::new(draft)
    }
}

impl DeploymentRequirements {
    /// Normalize a draft into requirements that satisfy every invariant
    pub fn new(draft: RequirementsDraft) -> Self {
        let custom_domain = draft
            .custom_domain
            .map(|d| d.trim().to_lowercase())
            .filter(|d| DOMAIN_RE.is_match(d));
        let ssl_required = draft.ssl_required || custom_domain.is_some();
        let region = provider_setting(draft.region);
        let instance_type = provider_setting(draft.instance_type);

        Self {
            cloud_provider: draft.cloud_provider,
            deployment_type: draft.deployment_type,
            region,
            instance_type,
            scaling: draft.scaling,
            custom_domain,
            ssl_required,
            additional_services: draft.additional_services,
            raw_description: draft.raw_description,
        }
    }

    pub fn cloud_provider(&self) -> CloudProvider {
        self.cloud_provider
    }

    pub fn deployment_type(&self) -> DeploymentType {
        self.deployment_type
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Region, falling back to the provider default
    pub fn region_or_default(&self) -> &str {
        self.region().unwrap_or(self.cloud_provider.default_region())
    }

    pub fn instance_type(&self) -> Option<&str> {
        self.instance_type.as_deref()
    }

    pub fn scaling(&self) -> ScalingPolicy {
        self.scaling
    }

    pub fn custom_domain(&self) -> Option<&str> {
        self.custom_domain.as_deref()
    }

    pub fn ssl_required(&self) -> bool {
        self.ssl_required
    }

    pub fn additional_services(&self) -> &[String] {
        &self.additional_services
    }

    pub fn raw_description(&self) -> &str {
        &self.raw_description
    }

    /// Replace the cloud provider (explicit user selection wins over inference)
    pub fn with_cloud_provider(mut self, provider: CloudProvider) -> Self {
        if provider != self.cloud_provider {
            self.cloud_provider = provider;
            self.region = None;
            self.instance_type = None;
        }
        self
    }
}
