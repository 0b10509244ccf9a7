//! Library-level runs of analysis and synthesis over fixture repositories.

mod common;

use autodeploy::application::IntentInterpreter;
use autodeploy::domain::entities::{AuxiliaryService, ComputeResources};
use autodeploy::domain::value_objects::{DatabaseKind, DeploymentType, Framework};
use autodeploy::infrastructure::synth::{aws_main_blocks, dockerfile};
use autodeploy::infrastructure::Synthesizer;
use autodeploy::{AnalysisUseCase, CloudProvider};
use common::*;
use tempfile::TempDir;

fn repo(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), files);
    dir
}

fn use_case() -> AnalysisUseCase {
    AnalysisUseCase::new(IntentInterpreter::rule_based())
}

#[test]
fn flask_postgres_autoscaling_on_aws() {
    let dir = repo(FLASK_POSTGRES_REPO);

    let report = use_case()
        .analyze(dir.path(), "Deploy on an AWS vm with auto-scaling please", None)
        .unwrap();

    assert_eq!(report.profile.framework, Some(Framework::Flask));
    assert_eq!(report.profile.database_type, Some(DatabaseKind::Postgresql));
    assert!(report.profile.environment_vars.contains(&"DATABASE_URL".to_string()));

    let plan = &report.plan;
    assert_eq!(plan.provider, CloudProvider::Aws);
    assert_eq!(plan.deployment_strategy, DeploymentType::Vm);
    assert!(matches!(
        plan.compute_resources,
        ComputeResources::Vm { count: 1, max_count: 3, auto_scaling: true, .. }
    ));
    assert!(plan.networking.load_balancer);
    assert!(plan.networking.private_subnet);
    assert_eq!(plan.database.spec().unwrap().engine, DatabaseKind::Postgresql);

    let blocks = aws_main_blocks(plan, &report.profile);
    for block in ["database", "load_balancer", "autoscaling", "private_subnet"] {
        assert!(blocks.contains(&block), "missing {block} in {blocks:?}");
    }

    let artifacts = Synthesizer::new().synthesize(plan, &report.profile);
    assert_eq!(
        artifacts.names(),
        vec!["main.tf", "variables.tf", "outputs.tf", "user_data.sh"]
    );
    let user_data = artifacts.get("user_data.sh").unwrap();
    assert!(user_data.contains("python3-pip"));
}

#[test]
fn express_with_mongo_in_containers_on_gcp() {
    let dir = repo(EXPRESS_MONGO_REPO);

    let report = use_case()
        .analyze(dir.path(), "run it in docker containers on gcp", None)
        .unwrap();

    let plan = &report.plan;
    assert_eq!(plan.provider, CloudProvider::Gcp);
    assert_eq!(plan.region, "us-central1");
    // a database keeps the app in containers
    assert_eq!(plan.deployment_strategy, DeploymentType::Container);
    assert!(matches!(plan.compute_resources, ComputeResources::CloudRun { .. }));
    assert_eq!(plan.database.spec().unwrap().engine, DatabaseKind::Mongodb);
    assert!(plan.has_cache());
    assert!(plan
        .additional_services
        .iter()
        .any(AuxiliaryService::is_monitoring));

    let artifacts = Synthesizer::new().synthesize(plan, &report.profile);
    assert_eq!(artifacts.names(), vec!["main.tf", "variables.tf", "outputs.tf"]);

    let descriptor = dockerfile::render(&report.profile);
    assert!(descriptor.starts_with("FROM node:18-alpine"));
    assert!(descriptor.contains("EXPOSE 3000"));
}

#[test]
fn simple_flask_container_request_becomes_vm() {
    let dir = repo(FLASK_REPO);

    let report = use_case()
        .analyze(dir.path(), "put this in a container on aws", None)
        .unwrap();

    assert_eq!(report.requirements.deployment_type(), DeploymentType::Vm);
    assert!(!report.plan.database.required());
    assert!(!report.plan.networking.private_subnet);
}

#[test]
fn custom_domain_turns_on_tls() {
    let dir = repo(FLASK_REPO);

    let report = use_case()
        .analyze(dir.path(), "small vm on aws, domain: shop.example.com", None)
        .unwrap();

    assert_eq!(report.requirements.custom_domain(), Some("shop.example.com"));
    assert!(report.plan.networking.ssl);
    assert_eq!(
        report.plan.networking.custom_domain.as_deref(),
        Some("shop.example.com")
    );
}

#[test]
fn empty_repository_still_gets_a_plan() {
    let dir = TempDir::new().unwrap();

    let report = use_case()
        .analyze(dir.path(), "a small vm on azure please", None)
        .unwrap();

    assert_eq!(report.profile.framework, None);
    assert_eq!(report.profile.confidence_score, 0.0);
    assert_eq!(report.plan.provider, CloudProvider::Azure);
    let main = Synthesizer::new()
        .synthesize(&report.plan, &report.profile)
        .get("main.tf")
        .unwrap()
        .to_string();
    assert!(main.contains("resource \"azurerm_resource_group\" \"main\""));
}
