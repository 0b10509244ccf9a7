//! Deployment type value object - the topology a workload runs on

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Deployment topology
///
/// Serialized with the short names the natural-language backend is asked
/// to produce (`vm`, `container`, `kubernetes`, `serverless`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    /// Single or auto-scaled virtual machines
    Vm,
    /// Managed container runtime
    #[default]
    Container,
    /// Orchestrated cluster
    Kubernetes,
    /// Function-as-a-service
    Serverless,
}

impl DeploymentType {
    /// Keyword-matching order used by the rule-based interpreter
    pub const MATCH_ORDER: [DeploymentType; 4] = [
        DeploymentType::Serverless,
        DeploymentType::Vm,
        DeploymentType::Container,
        DeploymentType::Kubernetes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Vm => "vm",
            DeploymentType::Container => "container",
            DeploymentType::Kubernetes => "kubernetes",
            DeploymentType::Serverless => "serverless",
        }
    }

    /// Whether the orchestrator has a workload deployment path for this topology
    pub fn has_workload_path(&self) -> bool {
        matches!(self, DeploymentType::Vm | DeploymentType::Container)
    }
}

impl FromStr for DeploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vm" | "virtual-machine" | "virtual_machine" => Ok(DeploymentType::Vm),
            "container" => Ok(DeploymentType::Container),
            "kubernetes" | "k8s" | "cluster" => Ok(DeploymentType::Kubernetes),
            "serverless" | "function" => Ok(DeploymentType::Serverless),
            other => Err(format!("unknown deployment type '{}'", other)),
        }
    }
}

impl std::fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
