//! Shared generators for domain values.

use proptest::prelude::*;

use autodeploy::domain::entities::{ApplicationProfile, ConfidenceSignals, ScalingPolicy};
use autodeploy::domain::value_objects::{
    AppType, CloudProvider, DatabaseKind, DeploymentType, Framework, Language,
};

pub fn provider() -> impl Strategy<Value = CloudProvider> {
    prop::sample::select(CloudProvider::ALL.to_vec())
}

pub fn topology() -> impl Strategy<Value = DeploymentType> {
    prop::sample::select(DeploymentType::MATCH_ORDER.to_vec())
}

pub fn scaling() -> impl Strategy<Value = ScalingPolicy> {
    (0u32..12, 0u32..12, any::<bool>()).prop_map(|(min, max, auto)| ScalingPolicy::new(min, max, auto))
}

pub fn signals() -> impl Strategy<Value = ConfidenceSignals> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(category_known, framework_known, entry_point_known, manifest_present)| {
            ConfidenceSignals {
                category_known,
                framework_known,
                entry_point_known,
                manifest_present,
            }
        },
    )
}

/// Profiles as the extractor would produce them
pub fn profile() -> impl Strategy<Value = ApplicationProfile> {
    (
        prop::option::of(prop::sample::select(Framework::ALL.to_vec())),
        prop::sample::select(Language::EXTENSIONS.iter().map(|(_, l)| *l).collect::<Vec<_>>()),
        prop::option::of(prop::sample::select(DatabaseKind::ALL.to_vec())),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        1024u16..=9999,
        signals(),
    )
        .prop_map(
            |(framework, language, database_type, redis, dockerfile, static_files, port, signals)| {
                ApplicationProfile {
                    app_type: AppType::from_framework(framework),
                    framework,
                    language,
                    port,
                    requires_database: database_type.is_some(),
                    database_type,
                    requires_redis: redis,
                    dockerfile_present: dockerfile,
                    static_files,
                    start_command: Some("./run".to_string()),
                    confidence_score: signals.score(),
                    ..Default::default()
                }
            },
        )
}

/// Free-form descriptions salted with words the interpreter reacts to
pub fn description() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "aws", "gcp", "azure", "vm", "container", "docker", "kubernetes", "lambda",
        "serverless", "scale", "autoscaling", "ssl", "https", "domain:", "shop.example.com",
        "europe", "singapore", "large", "medium", "small", "redis", "monitoring", "please",
    ]);
    (
        prop::collection::vec(words, 0..10),
        "[a-zA-Z0-9 .:,-]{0,40}",
    )
        .prop_map(|(words, noise)| format!("{} {}", words.join(" "), noise))
}
