//! Infrastructure policy engine
//!
//! Pure mapping from {profile, requirements} to an infrastructure plan.
//! No I/O, no randomness: the same inputs always give the same plan.

use crate::domain::entities::{
    ApplicationProfile, AuxiliaryService, ComputeResources, DatabasePlan, DatabaseSpec,
    DeploymentRequirements, InfrastructurePlan, Networking, Storage,
};
use crate::domain::services::cost::CostModel;
use crate::domain::services::rule_interpreter::instance_size;
use crate::domain::value_objects::{CloudProvider, DatabaseKind, DeploymentType};

pub const VM_OS: &str = "ubuntu-22.04";
pub const VM_DISK_GB: u32 = 20;
pub const STATIC_BUCKET: &str = "app-static-files";
pub const VOLUME_GB: u32 = 20;
pub const DB_STORAGE_GB: u32 = 20;
pub const DB_BACKUP_DAYS: u32 = 7;
pub const LOG_RETENTION_DAYS: u32 = 7;

/// Decides compute, networking, storage, database and auxiliary services
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(
        &self,
        profile: &ApplicationProfile,
        requirements: &DeploymentRequirements,
    ) -> InfrastructurePlan {
        let provider = requirements.cloud_provider();
        let strategy = requirements.deployment_type();

        let compute_resources = decide_compute(requirements);
        let networking = decide_networking(profile, requirements);
        let storage = decide_storage(profile);
        let database = decide_database(profile, provider);
        let additional_services = decide_services(profile, provider);

        let estimated_cost =
            CostModel::estimate(provider, &compute_resources, &database, &additional_services).to_string();
        let reasoning = reasoning(profile, requirements);

        InfrastructurePlan {
            provider,
            region: requirements.region_or_default().to_string(),
            deployment_strategy: strategy,
            compute_resources,
            networking,
            storage,
            database,
            additional_services,
            estimated_cost,
            reasoning,
        }
    }
}

fn decide_compute(requirements: &DeploymentRequirements) -> ComputeResources {
    let provider = requirements.cloud_provider();
    let scaling = requirements.scaling();
    let aws = provider == CloudProvider::Aws;

    match requirements.deployment_type() {
        DeploymentType::Vm => ComputeResources::Vm {
            instance_type: requirements
                .instance_type()
                .unwrap_or(instance_size(provider, "small"))
                .to_string(),
            count: scaling.min(),
            max_count: scaling.max(),
            auto_scaling: scaling.auto(),
            os: VM_OS.to_string(),
            disk_size_gb: VM_DISK_GB,
        },
        DeploymentType::Container if aws => ComputeResources::EcsFargate {
            cpu: 256,
            memory: 512,
            count: scaling.min(),
            max_count: scaling.max(),
            auto_scaling: scaling.auto(),
        },
        DeploymentType::Container => ComputeResources::CloudRun {
            cpu: 1,
            memory: "512Mi".to_string(),
            min_instances: scaling.min(),
            max_instances: scaling.max(),
        },
        DeploymentType::Kubernetes => ComputeResources::Kubernetes {
            service: if aws { "eks" } else { "gke" }.to_string(),
            node_count: 2,
            node_type: if aws { "t3.small" } else { "e2-small" }.to_string(),
            pod_replicas: scaling.min(),
        },
        DeploymentType::Serverless => ComputeResources::Serverless {
            service: if aws { "lambda" } else { "cloud_function" }.to_string(),
            memory_mb: 512,
            timeout_secs: 30,
        },
    }
}

fn decide_networking(
    profile: &ApplicationProfile,
    requirements: &DeploymentRequirements,
) -> Networking {
    Networking {
        vpc: true,
        public_subnet: true,
        private_subnet: profile.requires_database,
        load_balancer: requirements.scaling().needs_load_balancer(),
        ssl: requirements.ssl_required(),
        custom_domain: requirements.custom_domain().map(str::to_string),
    }
}

fn decide_storage(profile: &ApplicationProfile) -> Storage {
    Storage {
        object_storage: profile.static_files,
        bucket_name: profile.static_files.then(|| STATIC_BUCKET.to_string()),
        volume_size_gb: VOLUME_GB,
    }
}

fn decide_database(profile: &ApplicationProfile, provider: CloudProvider) -> DatabasePlan {
    if !profile.requires_database {
        return DatabasePlan::none();
    }
    let engine = profile.database_type.unwrap_or(DatabaseKind::Postgresql);
    let instance_class = if provider == CloudProvider::Aws {
        "db.t3.micro"
    } else {
        "db-f1-micro"
    };
    DatabasePlan::provisioned(DatabaseSpec {
        engine,
        version: engine.engine_version().to_string(),
        instance_class: instance_class.to_string(),
        storage_gb: DB_STORAGE_GB,
        backup_retention_days: DB_BACKUP_DAYS,
        multi_az: false,
    })
}

fn decide_services(profile: &ApplicationProfile, provider: CloudProvider) -> Vec<AuxiliaryService> {
    let aws = provider == CloudProvider::Aws;
    let mut services = Vec::new();
    if profile.requires_redis {
        services.push(AuxiliaryService::Redis {
            service: if aws { "elasticache" } else { "memorystore" }.to_string(),
            node_type: "cache.t3.micro".to_string(),
            num_nodes: 1,
        });
    }
    services.push(AuxiliaryService::Monitoring {
        service: if aws { "cloudwatch" } else { "cloud_monitoring" }.to_string(),
        log_retention_days: LOG_RETENTION_DAYS,
    });
    services
}

fn strategy_rationale(strategy: DeploymentType) -> &'static str {
    match strategy {
        DeploymentType::Vm => "Using VM deployment for simplicity and full control",
        DeploymentType::Container => {
            "Using containerized deployment for better isolation and scalability"
        }
        DeploymentType::Kubernetes => "Using Kubernetes for complex multi-service architecture",
        DeploymentType::Serverless => {
            "Using serverless for cost-effective, auto-scaling deployment"
        }
    }
}

fn reasoning(profile: &ApplicationProfile, requirements: &DeploymentRequirements) -> String {
    let mut reasons = vec![
        format!("Detected {} application", profile.display_kind()),
        strategy_rationale(requirements.deployment_type()).to_string(),
    ];
    if profile.requires_database {
        let kind = profile.database_type.unwrap_or(DatabaseKind::Postgresql);
        reasons.push(format!(
            "Provisioning managed {} database for data persistence",
            kind
        ));
    }
    if requirements.scaling().auto() {
        reasons.push("Configured auto-scaling for handling variable traffic".to_string());
    }
    format!("{}.", reasons.join(". "))
}
