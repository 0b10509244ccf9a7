//! Property tests for infrastructure code synthesis.

use proptest::prelude::*;

use autodeploy::domain::entities::{DeploymentRequirements, RequirementsDraft};
use autodeploy::domain::services::PolicyEngine;
use autodeploy::infrastructure::Synthesizer;

use super::strategies::{profile, provider, scaling, topology};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the same plan always yields byte-identical artifacts.
    #[test]
    fn property_synthesis_is_deterministic(
        profile in profile(),
        provider in provider(),
        topology in topology(),
        scaling in scaling(),
        domain in prop::option::of("[a-z]{3,8}\\.com"),
    ) {
        let requirements = DeploymentRequirements::new(RequirementsDraft {
            cloud_provider: provider,
            deployment_type: topology,
            scaling,
            custom_domain: domain,
            ..Default::default()
        });
        let plan = PolicyEngine::new().decide(&profile, &requirements);

        let first = Synthesizer::new().synthesize(&plan, &profile);
        let second = Synthesizer::new().synthesize(&plan, &profile);

        prop_assert_eq!(first.digest(), second.digest());
        prop_assert!(first.names().len() >= 3);
        for artifact in first.artifacts() {
            prop_assert!(!artifact.content.trim().is_empty(), "{} is empty", artifact.name);
        }
        let main = first.get("main.tf").unwrap();
        prop_assert!(main.contains("terraform {"), "main.tf lacks a terraform block");
    }
}
