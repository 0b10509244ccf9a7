//! Monthly cost model
//!
//! An additive, order-of-magnitude estimate used to compare plans. It is not
//! a billing computation and must not be presented as one.

use std::fmt;

use crate::domain::entities::{AuxiliaryService, ComputeResources, DatabasePlan};
use crate::domain::services::rule_interpreter::instance_size;
use crate::domain::value_objects::CloudProvider;

pub const VM_MICRO_MONTHLY: f64 = 8.50;
pub const VM_STANDARD_MONTHLY: f64 = 17.00;
pub const CONTAINER_MONTHLY: f64 = 15.00;
pub const CLUSTER_MONTHLY: f64 = 50.00;
pub const FUNCTION_MONTHLY: f64 = 5.00;
pub const DATABASE_MONTHLY: f64 = 15.00;
pub const CACHE_MONTHLY: f64 = 12.00;
pub const MONITORING_MONTHLY: f64 = 5.00;

/// Estimated monthly spend in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate(f64);

impl CostEstimate {
    pub fn monthly_usd(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}/month (estimated)", self.0)
    }
}

/// Additive cost model over plan descriptors
pub struct CostModel;

impl CostModel {
    pub fn estimate(
        provider: CloudProvider,
        compute: &ComputeResources,
        database: &DatabasePlan,
        services: &[AuxiliaryService],
    ) -> CostEstimate {
        let mut total = Self::compute_cost(provider, compute);
        if database.required() {
            total += DATABASE_MONTHLY;
        }
        total += services
            .iter()
            .map(|service| match service {
                AuxiliaryService::Redis { .. } => CACHE_MONTHLY,
                AuxiliaryService::Monitoring { .. } => MONITORING_MONTHLY,
            })
            .sum::<f64>();
        CostEstimate(total)
    }

    /// VMs of the provider's smallest size get the micro rate
    fn compute_cost(provider: CloudProvider, compute: &ComputeResources) -> f64 {
        match compute {
            ComputeResources::Vm {
                instance_type,
                count,
                ..
            } => {
                let per_instance = if instance_type == instance_size(provider, "small") {
                    VM_MICRO_MONTHLY
                } else {
                    VM_STANDARD_MONTHLY
                };
                per_instance * f64::from(*count)
            }
            ComputeResources::EcsFargate { .. } | ComputeResources::CloudRun { .. } => {
                CONTAINER_MONTHLY
            }
            ComputeResources::Kubernetes { .. } => CLUSTER_MONTHLY,
            ComputeResources::Serverless { .. } => FUNCTION_MONTHLY,
        }
    }
}
