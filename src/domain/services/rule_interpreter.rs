//! Rule-based intent interpreter
//!
//! Deterministic keyword matching over a lower-cased description. Used
//! directly when no language backend is configured and as the fallback
//! whenever a backend reply cannot be used.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::entities::{
    ApplicationProfile, DeploymentRequirements, RequirementsDraft, ScalingPolicy,
};
use crate::domain::value_objects::{CloudProvider, DatabaseKind, DeploymentType};

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:domain|url)[:\s]+([a-z0-9.-]+\.[a-z]{2,})").expect("domain pattern is valid")
});

static LB_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blb\b").expect("lb pattern is valid"));

const SCALING_KEYWORDS: [&str; 3] = ["scale", "auto-scal", "autoscal"];
const TLS_KEYWORDS: [&str; 2] = ["ssl", "https"];

/// Region names for one keyword group: (aws, gcp, azure)
struct RegionRow {
    keywords: &'static [&'static str],
    names: [&'static str; 3],
}

const REGIONS: [RegionRow; 4] = [
    RegionRow {
        keywords: &["us-east", "virginia", "us east"],
        names: ["us-east-1", "us-east1", "East US"],
    },
    RegionRow {
        keywords: &["us-west", "oregon", "us west"],
        names: ["us-west-2", "us-west1", "West US 2"],
    },
    RegionRow {
        keywords: &["eu-west", "ireland", "europe"],
        names: ["eu-west-1", "europe-west1", "West Europe"],
    },
    RegionRow {
        keywords: &["singapore", "asia"],
        names: ["ap-southeast-1", "asia-southeast1", "Southeast Asia"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizeHint {
    Small,
    Medium,
    Large,
}

fn provider_keywords(provider: CloudProvider) -> &'static [&'static str] {
    match provider {
        CloudProvider::Aws => &["aws", "amazon", "ec2", "lambda", "ecs", "fargate"],
        CloudProvider::Gcp => &["gcp", "google cloud", "gce", "cloud run", "app engine"],
        CloudProvider::Azure => &["azure", "microsoft", "azure vm", "azure functions"],
    }
}

fn topology_keywords(topology: DeploymentType) -> &'static [&'static str] {
    match topology {
        DeploymentType::Serverless => &[
            "serverless",
            "lambda",
            "function",
            "cloud run",
            "cloud functions",
        ],
        DeploymentType::Vm => &["vm", "virtual machine", "ec2", "compute engine", "instance"],
        DeploymentType::Container => &["container", "docker", "ecs", "fargate"],
        DeploymentType::Kubernetes => &["kubernetes", "k8s", "eks", "gke", "aks"],
    }
}

fn provider_index(provider: CloudProvider) -> usize {
    match provider {
        CloudProvider::Aws => 0,
        CloudProvider::Gcp => 1,
        CloudProvider::Azure => 2,
    }
}

/// Instance size name for a provider and size hint
pub fn instance_size(provider: CloudProvider, size: &str) -> &'static str {
    let hint = match size {
        "medium" => SizeHint::Medium,
        "large" => SizeHint::Large,
        _ => SizeHint::Small,
    };
    sized(provider, hint)
}

fn sized(provider: CloudProvider, hint: SizeHint) -> &'static str {
    match (provider, hint) {
        (CloudProvider::Aws, SizeHint::Small) => "t2.micro",
        (CloudProvider::Aws, SizeHint::Medium) => "t2.small",
        (CloudProvider::Aws, SizeHint::Large) => "t2.medium",
        (CloudProvider::Gcp, SizeHint::Small) => "e2-micro",
        (CloudProvider::Gcp, SizeHint::Medium) => "e2-small",
        (CloudProvider::Gcp, SizeHint::Large) => "e2-medium",
        (CloudProvider::Azure, SizeHint::Small) => "Standard_B1s",
        (CloudProvider::Azure, SizeHint::Medium) => "Standard_B1ms",
        (CloudProvider::Azure, SizeHint::Large) => "Standard_B2s",
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Deterministic keyword interpreter
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleInterpreter;

impl RuleInterpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn interpret(
        &self,
        description: &str,
        profile: &ApplicationProfile,
    ) -> DeploymentRequirements {
        let text = description.to_lowercase();

        let cloud_provider = detect_provider(&text);
        let deployment_type = refine_topology(detect_topology(&text), profile);
        let region = detect_region(&text, cloud_provider);
        let instance_type = sized(cloud_provider, detect_size(&text));

        let scaling = if contains_any(&text, &SCALING_KEYWORDS) {
            ScalingPolicy::autoscaling()
        } else {
            ScalingPolicy::fixed()
        };

        let custom_domain = DOMAIN_RE
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        let ssl_required = contains_any(&text, &TLS_KEYWORDS);

        DeploymentRequirements::new(RequirementsDraft {
            cloud_provider,
            deployment_type,
            region: Some(region.to_string()),
            instance_type: Some(instance_type.to_string()),
            scaling,
            custom_domain,
            ssl_required,
            additional_services: auxiliary_services(&text, profile),
            raw_description: description.to_string(),
        })
    }
}

fn detect_provider(text: &str) -> CloudProvider {
    CloudProvider::ALL
        .into_iter()
        .find(|provider| contains_any(text, provider_keywords(*provider)))
        .unwrap_or_default()
}

fn detect_topology(text: &str) -> DeploymentType {
    DeploymentType::MATCH_ORDER
        .into_iter()
        .find(|topology| contains_any(text, topology_keywords(*topology)))
        .unwrap_or_default()
}

/// Container stays container for stateful or composed apps; simple web
/// frameworks are moved to a single VM.
fn refine_topology(topology: DeploymentType, profile: &ApplicationProfile) -> DeploymentType {
    if topology != DeploymentType::Container {
        return topology;
    }
    if profile.requires_database || profile.docker_compose_present {
        return DeploymentType::Container;
    }
    match profile.framework {
        Some(fw) if fw.is_simple_web() => DeploymentType::Vm,
        _ => DeploymentType::Container,
    }
}

fn detect_region(text: &str, provider: CloudProvider) -> &'static str {
    REGIONS
        .iter()
        .find(|row| contains_any(text, row.keywords))
        .map(|row| row.names[provider_index(provider)])
        .unwrap_or(provider.default_region())
}

fn detect_size(text: &str) -> SizeHint {
    if text.contains("small") || text.contains("micro") {
        SizeHint::Small
    } else if text.contains("medium") {
        SizeHint::Medium
    } else if text.contains("large") {
        SizeHint::Large
    } else {
        SizeHint::Small
    }
}

fn auxiliary_services(text: &str, profile: &ApplicationProfile) -> Vec<String> {
    let mut services = Vec::new();
    if profile.requires_database {
        let kind = profile.database_type.unwrap_or(DatabaseKind::Postgresql);
        services.push(format!("database_{}", kind));
    }
    if profile.requires_redis {
        services.push("redis".to_string());
    }
    if text.contains("load balancer") || LB_WORD_RE.is_match(text) {
        services.push("load_balancer".to_string());
    }
    services
}
