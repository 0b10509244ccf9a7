//! Property tests for deployment identities and derived resource names.

use proptest::prelude::*;

use autodeploy::DeploymentId;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: generated identities parse back and derived names stay short and lowercase.
    #[test]
    fn property_resource_names_fit_provider_limits(
        seed in any::<u64>(),
        secs in 0i64..4_102_444_800,
        prefix in "(?s).{0,40}",
    ) {
        let now = Utc.timestamp_opt(secs, 0).unwrap();
        let id = DeploymentId::generate_at(now, &mut StdRng::seed_from_u64(seed));

        let parsed: DeploymentId = id.as_str().parse().unwrap();
        prop_assert_eq!(&parsed, &id);

        let name = id.resource_name(&prefix);
        // derived names add suffixes such as "-alb"; the tightest limit is 32
        prop_assert!(name.len() + "-alb".len() <= 32, "{} too long", name);
        prop_assert!(name.starts_with(|c: char| c.is_ascii_lowercase()));
        prop_assert!(name.ends_with(id.as_str()));
        prop_assert!(name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    /// PROPERTY: identities with uppercase letters are rejected.
    #[test]
    fn property_uppercase_ids_are_rejected(id in "[a-z0-9]{0,5}[A-Z][a-zA-Z0-9]{0,5}") {
        prop_assert!(id.parse::<DeploymentId>().is_err());
    }
}
