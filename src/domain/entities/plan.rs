//! Infrastructure plan entity
//!
//! The concrete infrastructure shape derived from a profile and a set of
//! requirements. Every nested descriptor is a closed, tagged type so the
//! synthesizer can branch exhaustively.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CloudProvider, DatabaseKind, DeploymentType};

/// Compute resource descriptor, shaped by the deployment strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComputeResources {
    /// Virtual machines with replica bounds
    Vm {
        instance_type: String,
        count: u32,
        max_count: u32,
        auto_scaling: bool,
        os: String,
        disk_size_gb: u32,
    },
    /// Managed task runtime (task-level CPU units and MiB)
    EcsFargate {
        cpu: u32,
        memory: u32,
        count: u32,
        max_count: u32,
        auto_scaling: bool,
    },
    /// Managed request runtime (vCPU and a memory quantity string)
    CloudRun {
        cpu: u32,
        memory: String,
        min_instances: u32,
        max_instances: u32,
    },
    /// Orchestrated cluster
    Kubernetes {
        service: String,
        node_count: u32,
        node_type: String,
        pod_replicas: u32,
    },
    /// Function runtime
    Serverless {
        service: String,
        memory_mb: u32,
        timeout_secs: u32,
    },
}

impl ComputeResources {
    /// Deployment topology this descriptor belongs to
    pub fn kind(&self) -> DeploymentType {
        match self {
            ComputeResources::Vm { .. } => DeploymentType::Vm,
            ComputeResources::EcsFargate { .. } | ComputeResources::CloudRun { .. } => {
                DeploymentType::Container
            }
            ComputeResources::Kubernetes { .. } => DeploymentType::Kubernetes,
            ComputeResources::Serverless { .. } => DeploymentType::Serverless,
        }
    }

    pub fn is_vm(&self) -> bool {
        matches!(self, ComputeResources::Vm { .. })
    }

    /// VM compute with auto-scaling turned on
    pub fn is_autoscaling_vm(&self) -> bool {
        matches!(self, ComputeResources::Vm { auto_scaling: true, .. })
    }

    /// Short label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            ComputeResources::Vm { .. } => "vm",
            ComputeResources::EcsFargate { .. } => "ecs_fargate",
            ComputeResources::CloudRun { .. } => "cloud_run",
            ComputeResources::Kubernetes { .. } => "kubernetes",
            ComputeResources::Serverless { .. } => "serverless",
        }
    }
}

/// Networking descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networking {
    pub vpc: bool,
    pub public_subnet: bool,
    pub private_subnet: bool,
    pub load_balancer: bool,
    pub ssl: bool,
    pub custom_domain: Option<String>,
}

/// Storage descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    pub object_storage: bool,
    pub bucket_name: Option<String>,
    pub volume_size_gb: u32,
}

/// Managed database sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub engine: DatabaseKind,
    pub version: String,
    pub instance_class: String,
    pub storage_gb: u32,
    pub backup_retention_days: u32,
    pub multi_az: bool,
}

/// Database descriptor
///
/// `required` and the presence of a spec cannot disagree: the only
/// constructors are [`DatabasePlan::none`] and [`DatabasePlan::provisioned`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DatabaseDraft")]
pub struct DatabasePlan {
    required: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    spec: Option<DatabaseSpec>,
}

#[derive(Deserialize)]
struct DatabaseDraft {
    #[serde(flatten)]
    spec: Option<DatabaseSpec>,
}

impl From<DatabaseDraft> for DatabasePlan {
    fn from(draft: DatabaseDraft) -> Self {
        match draft.spec {
            Some(spec) => DatabasePlan::provisioned(spec),
            None => DatabasePlan::none(),
        }
    }
}

impl DatabasePlan {
    pub fn none() -> Self {
        Self {
            required: false,
            spec: None,
        }
    }

    pub fn provisioned(spec: DatabaseSpec) -> Self {
        Self {
            required: true,
            spec: Some(spec),
        }
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn spec(&self) -> Option<&DatabaseSpec> {
        self.spec.as_ref()
    }
}

/// Auxiliary service descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuxiliaryService {
    Redis {
        service: String,
        node_type: String,
        num_nodes: u32,
    },
    Monitoring {
        service: String,
        log_retention_days: u32,
    },
}

impl AuxiliaryService {
    pub fn is_cache(&self) -> bool {
        matches!(self, AuxiliaryService::Redis { .. })
    }

    pub fn is_monitoring(&self) -> bool {
        matches!(self, AuxiliaryService::Monitoring { .. })
    }
}

/// Concrete infrastructure shape plus cost estimate and justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructurePlan {
    pub provider: CloudProvider,
    pub region: String,
    pub deployment_strategy: DeploymentType,
    pub compute_resources: ComputeResources,
    pub networking: Networking,
    pub storage: Storage,
    pub database: DatabasePlan,
    pub additional_services: Vec<AuxiliaryService>,
    /// Rough order-of-magnitude monthly estimate, not a billing figure
    pub estimated_cost: String,
    pub reasoning: String,
}

impl InfrastructurePlan {
    pub fn has_cache(&self) -> bool {
        self.additional_services.iter().any(AuxiliaryService::is_cache)
    }
}
