//! Property tests for the policy engine.

use proptest::prelude::*;

use autodeploy::domain::entities::{ComputeResources, DeploymentRequirements, RequirementsDraft};
use autodeploy::domain::services::PolicyEngine;

use super::strategies::{profile, provider, scaling, signals, topology};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: confidence stays within [0, 1].
    #[test]
    fn property_confidence_is_bounded(signals in signals()) {
        let score = signals.score();
        prop_assert!((0.0..=1.0).contains(&score));
    }

    /// PROPERTY: plans agree with their inputs.
    #[test]
    fn property_plan_agrees_with_profile_and_requirements(
        profile in profile(),
        provider in provider(),
        topology in topology(),
        scaling in scaling(),
    ) {
        let requirements = DeploymentRequirements::new(RequirementsDraft {
            cloud_provider: provider,
            deployment_type: topology,
            scaling,
            ..Default::default()
        });
        let plan = PolicyEngine::new().decide(&profile, &requirements);

        prop_assert_eq!(plan.provider, provider);
        prop_assert_eq!(plan.deployment_strategy, topology);
        prop_assert_eq!(plan.compute_resources.kind(), topology);
        prop_assert_eq!(plan.database.required(), profile.requires_database);
        prop_assert_eq!(plan.networking.private_subnet, profile.requires_database);
        prop_assert_eq!(plan.storage.object_storage, profile.static_files);
        prop_assert_eq!(plan.has_cache(), profile.requires_redis);
        if scaling.auto() {
            prop_assert!(plan.networking.load_balancer);
        }
        if let ComputeResources::Vm { count, max_count, .. } = plan.compute_resources {
            prop_assert!(count >= 1 && max_count >= count);
        }
        prop_assert!(plan.estimated_cost.starts_with('$'));
        prop_assert!(plan.reasoning.ends_with('.'));
    }
}
