//! Property tests for requirement interpretation and normalization.

use proptest::prelude::*;

use autodeploy::application::interpret::ingest_reply;
use autodeploy::domain::entities::{DeploymentRequirements, RequirementsDraft, ScalingPolicy};
use autodeploy::domain::services::RuleInterpreter;

use super::strategies::{description, profile, provider, scaling, topology};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: scaling bounds are always repaired to 1 <= min <= max.
    #[test]
    fn property_scaling_bounds_are_repaired(min in any::<u32>(), max in any::<u32>(), auto in any::<bool>()) {
        let policy = ScalingPolicy::new(min, max, auto);
        prop_assert!(policy.min() >= 1);
        prop_assert!(policy.max() >= policy.min());
        prop_assert_eq!(policy.auto(), auto);
    }

    /// PROPERTY: a custom domain always implies TLS.
    #[test]
    fn property_domain_implies_tls(
        host in "[a-z]{1,12}\\.(com|io|dev)",
        ssl in any::<bool>(),
        provider in provider(),
        topology in topology(),
        scaling in scaling(),
    ) {
        let requirements = DeploymentRequirements::new(RequirementsDraft {
            cloud_provider: provider,
            deployment_type: topology,
            scaling,
            custom_domain: Some(host.clone()),
            ssl_required: ssl,
            ..Default::default()
        });
        prop_assert!(requirements.ssl_required());
        prop_assert_eq!(requirements.custom_domain(), Some(host.as_str()));
    }

    /// PROPERTY: the rule interpreter never panics and keeps every invariant.
    #[test]
    fn property_rule_interpreter_output_is_valid(text in description(), profile in profile()) {
        let requirements = RuleInterpreter::new().interpret(&text, &profile);
        prop_assert!(requirements.scaling().min() >= 1);
        prop_assert!(requirements.scaling().max() >= requirements.scaling().min());
        if requirements.custom_domain().is_some() {
            prop_assert!(requirements.ssl_required());
        }
        prop_assert_eq!(requirements.raw_description(), text.as_str());
    }

    /// PROPERTY: any numeric scaling a backend replies with is repaired.
    #[test]
    fn property_backend_scaling_is_repaired(min in -50i64..50, max in -50i64..50) {
        let reply = format!(
            r#"Sure! {{"cloud_provider": "gcp", "scaling": {{"min": {min}, "max": {max}, "auto": true}}}}"#
        );
        let requirements = ingest_reply(&reply, "scale it on gcp").unwrap();
        prop_assert!(requirements.scaling().min() >= 1);
        prop_assert!(requirements.scaling().max() >= requirements.scaling().min());
        prop_assert_eq!(requirements.raw_description(), "scale it on gcp");
    }

    /// PROPERTY: ingesting arbitrary text never panics.
    #[test]
    fn property_ingest_never_panics(reply in "(?s).{0,200}") {
        let _ = ingest_reply(&reply, "anything at all");
    }
}
