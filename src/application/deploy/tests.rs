//! Deploy Use Case Tests

use super::*;
use crate::domain::entities::{
    Addressing, ApplicationProfile, DeploymentRecord, DeploymentRequirements, DeploymentStatus,
    InfrastructurePlan, RequirementsDraft, ScalingPolicy, TargetKind,
};
use crate::domain::ports::{
    CommandError, CommandOutput, CommandRunner, CommandSpec, DeployEvent, DeployEventSink,
    HealthProbe, ProbeError, Stage,
};
use crate::domain::services::PolicyEngine;
use crate::domain::value_objects::{
    CloudProvider, DeploymentId, DeploymentType, Framework, Language, RepoSource,
};
use crate::infrastructure::synth::scripts;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

const RUN_ID: &str = "20261019000000-test01";
const INSTANCE_OUTPUTS: &str =
    r#"{"instance_public_ip":{"sensitive":false,"type":"string","value":"203.0.113.10"}}"#;

// Mock implementations for testing

type Matcher = Box<dyn Fn(&CommandSpec) -> bool>;

struct Rule {
    matches: Matcher,
    queued: RefCell<VecDeque<CommandOutput>>,
    fallback: CommandOutput,
}

/// Replies to commands from matching rules; unmatched commands succeed
/// with empty output. Every invocation is recorded.
#[derive(Default)]
struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    fn new() -> Self {
        Self::default()
    }

    /// Answer matching commands with `output` every time
    fn on(self, matches: impl Fn(&CommandSpec) -> bool + 'static, output: CommandOutput) -> Self {
        self.on_sequence(matches, Vec::new(), output)
    }

    /// Answer with `queued` in order, then `fallback`
    fn on_sequence(
        mut self,
        matches: impl Fn(&CommandSpec) -> bool + 'static,
        queued: Vec<CommandOutput>,
        fallback: CommandOutput,
    ) -> Self {
        self.rules.push(Rule {
            matches: Box::new(matches),
            queued: RefCell::new(queued.into()),
            fallback,
        });
        self
    }

    fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    fn count(&self, predicate: impl Fn(&CommandSpec) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(*c)).count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.calls.borrow_mut().push(spec.clone());
        let output = self
            .rules
            .iter()
            .find(|rule| (rule.matches)(spec))
            .map(|rule| {
                rule.queued
                    .borrow_mut()
                    .pop_front()
                    .unwrap_or_else(|| rule.fallback.clone())
            })
            .unwrap_or_else(|| ok(""));
        Ok(output)
    }
}

struct StubProbe {
    replies: RefCell<VecDeque<Result<u16, String>>>,
    probed: RefCell<Vec<String>>,
}

impl StubProbe {
    fn unreachable() -> Self {
        Self::replying(Vec::new())
    }

    fn replying(replies: Vec<Result<u16, String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            probed: RefCell::new(Vec::new()),
        }
    }
}

impl HealthProbe for StubProbe {
    fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        self.probed.borrow_mut().push(url.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("connection refused".to_string()))
            .map_err(ProbeError)
    }
}

#[derive(Default)]
struct RecordingEventSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl DeployEventSink for RecordingEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// Fixtures

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

fn terraform(subcommand: &'static str) -> impl Fn(&CommandSpec) -> bool {
    move |spec| spec.program == "terraform" && spec.args.first().map(String::as_str) == Some(subcommand)
}

fn ssh_ready_check(spec: &CommandSpec) -> bool {
    spec.program == "ssh"
        && spec
            .args
            .iter()
            .any(|a| a == &format!("test -f {}", scripts::BOOTSTRAP_MARKER))
}

fn is_scp(spec: &CommandSpec) -> bool {
    spec.program == "scp"
}

struct Fixture {
    _dir: TempDir,
    repo: PathBuf,
    work_root: PathBuf,
    key: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("app");
        std::fs::create_dir_all(&repo).unwrap();
        std::fs::write(repo.join("app.py"), "from flask import Flask\napp = Flask(__name__)\n")
            .unwrap();
        std::fs::write(repo.join("requirements.txt"), "flask==3.0.0\n").unwrap();
        let key = dir.path().join("id_test.pub");
        std::fs::write(&key, "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAITEST test@host\n").unwrap();
        let work_root = dir.path().join("work");
        Self {
            _dir: dir,
            repo,
            work_root,
            key,
        }
    }

    fn options(&self) -> DeployOptions {
        DeployOptions::new(
            RepoSource::Directory {
                path: self.repo.clone(),
            },
            &self.work_root,
        )
        .with_deployment_id(Some(RUN_ID.parse::<DeploymentId>().unwrap()))
        .with_ssh_key_path(Some(self.key.clone()))
        .with_timing(Timing::immediate())
    }

    fn run_dir(&self) -> PathBuf {
        self.work_root.join(RUN_ID)
    }
}

fn flask_profile() -> ApplicationProfile {
    ApplicationProfile {
        framework: Some(Framework::Flask),
        language: Language::Python,
        port: 5000,
        start_command: Some("python app.py".to_string()),
        entry_point: Some("app.py".to_string()),
        ..Default::default()
    }
}

fn plan_for(profile: &ApplicationProfile, deployment_type: DeploymentType) -> InfrastructurePlan {
    let reqs = DeploymentRequirements::new(RequirementsDraft {
        cloud_provider: CloudProvider::Aws,
        deployment_type,
        scaling: ScalingPolicy::fixed(),
        ..Default::default()
    });
    PolicyEngine::new().decide(profile, &reqs)
}

fn run(
    runner: &ScriptedRunner,
    probe: &StubProbe,
    options: &DeployOptions,
    profile: &ApplicationProfile,
    plan: &InfrastructurePlan,
) -> DeploymentRecord {
    DeployUseCase::new(runner, probe).execute(options, profile, plan)
}

// Tests

#[test]
fn apply_failure_fails_record_with_tool_stderr() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(
        terraform("apply"),
        failed("Error: UnauthorizedOperation: not authorized to perform ec2:RunInstances"),
    );
    let probe = StubProbe::unreachable();

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert_eq!(record.status(), DeploymentStatus::Failed);
    let error = record.error().unwrap();
    assert!(error.contains("terraform apply failed"), "{}", error);
    assert!(error.contains("UnauthorizedOperation"));
    assert!(record.logs().last().unwrap().contains("UnauthorizedOperation"));
    assert!(record.info().is_none());
    // Nothing after provisioning ran
    assert_eq!(runner.count(terraform("output")), 0);
    assert!(probe.probed.borrow().is_empty());
}

#[test]
fn vm_deploy_succeeds_with_soft_health_warning() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(terraform("output"), ok(INSTANCE_OUTPUTS));
    let probe = StubProbe::unreachable();

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert!(record.is_success(), "{:?}", record.error());
    let info = record.info().unwrap();
    assert_eq!(info.target, TargetKind::Vm);
    assert_eq!(info.url.as_deref(), Some("http://203.0.113.10:5000"));
    assert_eq!(
        info.addressing,
        Some(Addressing::InstanceIp("203.0.113.10".to_string()))
    );
    assert_eq!(probe.probed.borrow().len(), Timing::immediate().health_attempts as usize);
    assert!(record
        .warnings()
        .iter()
        .any(|w| w.contains("health check of http://203.0.113.10:5000")));

    // Artifacts and the deploy script land in the run directory
    assert!(fixture.run_dir().join("terraform/main.tf").exists());
    assert!(fixture.run_dir().join("deploy.sh").exists());
    assert!(fixture.run_dir().join("repo/app.py").exists());

    // Repo and script were copied, then executed remotely
    let calls = runner.calls();
    let scp: Vec<_> = calls.iter().filter(|c| is_scp(c)).collect();
    assert_eq!(scp.len(), 2);
    assert!(scp[0].args.iter().any(|a| a == "-r"));
    assert!(scp[0]
        .args
        .last()
        .unwrap()
        .ends_with(&format!("203.0.113.10:/tmp/app-{}", RUN_ID)));
    let last = calls.last().unwrap();
    assert_eq!(last.program, "ssh");
    assert!(last
        .args
        .last()
        .unwrap()
        .contains(&format!("sudo bash /tmp/deploy-{}.sh", RUN_ID)));
}

#[test]
fn first_2xx_probe_ends_verification() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(terraform("output"), ok(INSTANCE_OUTPUTS));
    let probe = StubProbe::replying(vec![Err("connection refused".to_string()), Ok(503), Ok(200)]);

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert!(record.is_success());
    assert_eq!(probe.probed.borrow().len(), 3);
    assert!(record.warnings().is_empty(), "{:?}", record.warnings());
    assert!(record.logs().iter().any(|l| l.contains("returned HTTP 200")));
}

#[test]
fn readiness_timeout_is_a_soft_failure() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new()
        .on(terraform("output"), ok(INSTANCE_OUTPUTS))
        .on(ssh_ready_check, failed(""));
    let probe = StubProbe::replying(vec![Ok(200)]);

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert!(record.is_success());
    assert_eq!(
        runner.count(ssh_ready_check),
        Timing::immediate().readiness_attempts as usize
    );
    assert_eq!(runner.count(is_scp), 0);
    assert!(record
        .warnings()
        .iter()
        .any(|w| w.contains("remote setup failed") && w.contains("did not finish bootstrapping")));
}

#[test]
fn runtime_without_bootstrap_package_still_gets_deployed() {
    let fixture = Fixture::new();
    let profile = ApplicationProfile {
        language: Language::Ruby,
        port: 3000,
        start_command: Some("bundle exec rails server -b 0.0.0.0".to_string()),
        ..Default::default()
    };
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new()
        .on(terraform("output"), ok(INSTANCE_OUTPUTS))
        .on_sequence(ssh_ready_check, vec![failed(""), failed("")], ok(""));
    let probe = StubProbe::replying(vec![Ok(200)]);

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert!(record.is_success(), "{:?}", record.error());
    assert!(record.warnings().is_empty(), "{:?}", record.warnings());
    assert_eq!(runner.count(ssh_ready_check), 3);
    assert_eq!(runner.count(is_scp), 2);
    let calls = runner.calls();
    assert!(!calls
        .iter()
        .any(|c| c.args.iter().any(|a| a.contains("command -v ruby"))));
    let last = calls.last().unwrap();
    assert_eq!(last.program, "ssh");
    assert!(last
        .args
        .iter()
        .any(|a| a.contains(&scripts::remote_script_path(RUN_ID))));
    assert!(record
        .logs()
        .iter()
        .any(|l| l.contains("Host 203.0.113.10 finished bootstrapping")));
}

#[test]
fn missing_instance_address_skips_remote_setup() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(terraform("output"), ok("{}"));
    let probe = StubProbe::unreachable();

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert!(record.is_success());
    assert_eq!(record.info().unwrap().url, None);
    assert_eq!(runner.count(|c| c.program == "ssh"), 0);
    assert!(probe.probed.borrow().is_empty());
    assert!(record
        .warnings()
        .iter()
        .any(|w| w.contains("no instance address")));
}

#[test]
fn cluster_topology_is_rejected_before_any_stage() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Kubernetes);
    let runner = ScriptedRunner::new();
    let probe = StubProbe::unreachable();

    let record = run(&runner, &probe, &fixture.options(), &profile, &plan);

    assert_eq!(record.status(), DeploymentStatus::Failed);
    assert!(record.error().unwrap().contains("'kubernetes' deployments are not supported"));
    assert!(runner.calls().is_empty());
    assert!(!fixture.run_dir().exists());
}

#[test]
fn container_path_builds_image_and_reports_placeholder() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Container);
    let runner = ScriptedRunner::new();
    let probe = StubProbe::unreachable();
    let events = Arc::new(RecordingEventSink::default());

    let record = DeployUseCase::new(&runner, &probe)
        .with_events(events.clone())
        .execute(&fixture.options(), &profile, &plan);

    assert!(record.is_success(), "{:?}", record.error());
    let info = record.info().unwrap();
    assert_eq!(info.target, TargetKind::Container);
    assert_eq!(info.url, None);
    assert_eq!(
        info.addressing,
        Some(Addressing::LoadBalancerDns(PLACEHOLDER_LB_ADDRESS.to_string()))
    );
    let image = format!("ad-{}:latest", RUN_ID);
    assert_eq!(info.image.as_deref(), Some(image.as_str()));

    let dockerfile = std::fs::read_to_string(fixture.run_dir().join("repo/Dockerfile")).unwrap();
    assert!(dockerfile.starts_with("FROM python:3.11-slim"));
    assert_eq!(
        runner.count(|c| c.program == "docker" && c.args.contains(&image)),
        1
    );
    assert!(record.logs().iter().any(|l| l.contains("Would push")));
    assert!(probe.probed.borrow().is_empty());

    let events = events.events.lock().unwrap();
    assert!(events.contains(&DeployEvent::StageSkipped {
        stage: Stage::Verify,
        reason: "no endpoint URL to probe".to_string(),
    }));
    assert_eq!(
        events.last(),
        Some(&DeployEvent::Finished {
            status: "success".to_string()
        })
    );
}

#[test]
fn existing_dockerfile_is_kept() {
    let fixture = Fixture::new();
    std::fs::write(fixture.repo.join("Dockerfile"), "FROM scratch\n").unwrap();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Container);
    let runner = ScriptedRunner::new();

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    assert!(record.is_success());
    assert_eq!(
        std::fs::read_to_string(fixture.run_dir().join("repo/Dockerfile")).unwrap(),
        "FROM scratch\n"
    );
}

#[test]
fn container_build_failure_is_fatal() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Container);
    let runner =
        ScriptedRunner::new().on(|c| c.program == "docker", failed("Cannot connect to the Docker daemon"));

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    assert_eq!(record.status(), DeploymentStatus::Failed);
    assert!(record.error().unwrap().contains("Docker daemon"));
}

#[test]
fn build_failure_stops_pipeline() {
    let fixture = Fixture::new();
    let profile = ApplicationProfile {
        build_command: Some("npm run build".to_string()),
        ..flask_profile()
    };
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(|c| c.program == "sh", failed("npm ERR! missing script: build"));

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    assert_eq!(record.status(), DeploymentStatus::Failed);
    let error = record.error().unwrap();
    assert!(error.contains("build command 'npm run build' failed"), "{}", error);
    assert!(error.contains("missing script"));
    assert_eq!(runner.count(|c| c.program == "terraform"), 0);
    assert!(!fixture.run_dir().join("terraform").exists());
}

#[test]
fn build_runs_in_staged_repository() {
    let fixture = Fixture::new();
    let profile = ApplicationProfile {
        build_command: Some("make".to_string()),
        ..flask_profile()
    };
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new();

    run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    let calls = runner.calls();
    let build = calls.iter().find(|c| c.program == "sh").unwrap();
    assert_eq!(build.args, vec!["-c".to_string(), "make".to_string()]);
    assert_eq!(build.cwd.as_deref(), Some(fixture.run_dir().join("repo").as_path()));
}

#[test]
fn cancelled_before_start_yields_cancelled_record() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new();
    let token = CancelToken::new();
    token.cancel();

    let record = DeployUseCase::new(&runner, &StubProbe::unreachable())
        .with_cancel_token(token)
        .execute(&fixture.options(), &profile, &plan);

    assert_eq!(record.status(), DeploymentStatus::Cancelled);
    assert!(runner.calls().is_empty());
    assert!(record.logs().last().unwrap().contains("cancelled"));
}

#[test]
fn flaky_init_is_retried() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new()
        .on_sequence(
            terraform("init"),
            vec![failed("Error: Failed to query available provider packages")],
            ok(""),
        )
        .on(terraform("output"), ok("{}"));

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    assert!(record.is_success(), "{:?}", record.error());
    assert_eq!(runner.count(terraform("init")), 2);
}

#[test]
fn init_gives_up_after_retry_budget() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(terraform("init"), failed("Error: registry unreachable"));

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    assert_eq!(record.status(), DeploymentStatus::Failed);
    assert!(record.error().unwrap().contains("terraform init failed"));
    assert_eq!(
        runner.count(terraform("init")),
        Timing::immediate().retry_attempts as usize
    );
}

#[test]
fn plan_with_pending_changes_counts_as_success() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let changes = CommandOutput {
        code: Some(2),
        ..CommandOutput::default()
    };
    let runner = ScriptedRunner::new()
        .on(terraform("plan"), changes)
        .on(terraform("output"), ok("{}"));

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    assert!(record.is_success(), "{:?}", record.error());
    assert_eq!(runner.count(terraform("apply")), 1);
}

#[test]
fn database_password_never_reaches_the_log() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(terraform("output"), ok("{}"));

    let record = run(&runner, &StubProbe::unreachable(), &fixture.options(), &profile, &plan);

    let calls = runner.calls();
    let is_plan = terraform("plan");
    let plan_call = calls.iter().find(|c| is_plan(*c)).unwrap();
    let password = plan_call
        .args
        .iter()
        .find_map(|a| a.strip_prefix("db_password="))
        .unwrap();
    assert_eq!(password.len(), 16);
    assert!(record.logs().iter().all(|l| !l.contains(password)));
    assert!(record.logs().iter().any(|l| l.contains("db_password=***")));

    let app_name = format!("app_name=ad-{}", RUN_ID);
    assert!(plan_call.args.contains(&app_name));
    assert!(plan_call
        .args
        .iter()
        .any(|a| a.starts_with("ssh_public_key=ssh-ed25519")));
    assert!(plan_call.args.contains(&"aws_region=us-east-1".to_string()));
}

#[test]
fn stages_are_reported_in_order() {
    let fixture = Fixture::new();
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Vm);
    let runner = ScriptedRunner::new().on(terraform("output"), ok(INSTANCE_OUTPUTS));
    let events = Arc::new(RecordingEventSink::default());

    DeployUseCase::new(&runner, &StubProbe::replying(vec![Ok(200)]))
        .with_events(events.clone())
        .execute(&fixture.options(), &profile, &plan);

    let started: Vec<Stage> = events
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            DeployEvent::StageStarted { stage } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(started, Stage::ALL.to_vec());
}

#[test]
fn archive_source_is_unpacked_to_single_root() {
    let fixture = Fixture::new();
    let archive = fixture.work_root.with_file_name("app.tar");
    {
        let file = std::fs::File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(file);
        builder.append_dir_all("myapp-main", &fixture.repo).unwrap();
        builder.finish().unwrap();
    }
    let options = DeployOptions {
        source: RepoSource::parse(archive.to_str().unwrap()).unwrap(),
        ..fixture.options()
    };
    let profile = flask_profile();
    let plan = plan_for(&profile, DeploymentType::Container);
    let runner = ScriptedRunner::new();

    let record = run(&runner, &StubProbe::unreachable(), &options, &profile, &plan);

    assert!(record.is_success(), "{:?}", record.error());
    let docker = runner
        .calls()
        .into_iter()
        .find(|c| c.program == "docker")
        .unwrap();
    let cwd = docker.cwd.unwrap();
    assert!(cwd.ends_with("repo/myapp-main"), "{}", cwd.display());
    assert!(cwd.join("app.py").exists());
}
