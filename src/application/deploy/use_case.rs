//! Deploy Use Case
//!
//! Runs the orchestration stages strictly in order:
//! 1. Stage the repository into the run's working directory
//! 2. Run the build command, if any
//! 3. Write a container descriptor when the repository has none
//! 4. Synthesize infrastructure code
//! 5. init / plan / apply
//! 6. Read back outputs
//! 7. Deploy the workload (VM or container path)
//! 8. Verify over HTTP
//!
//! Stages 1-6 are fatal on failure. Once infrastructure exists, workload
//! and verification problems are recorded as warnings instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::entities::{
    Addressing, ApplicationProfile, ComputeResources, DeploymentInfo, DeploymentRecord,
    InfrastructurePlan, RecordBuilder, TargetKind,
};
use crate::domain::ports::{
    CommandOutput, CommandRunner, CommandSpec, DeployEvent, DeployEventSink, HealthProbe,
    NoopEventSink, Stage,
};
use crate::domain::value_objects::{CloudProvider, DeploymentId, RepoSource};
use crate::infrastructure::fs::{private_key_for, ssh_public_key, write_executable, SshKeySource};
use crate::infrastructure::remote::RemoteHost;
use crate::infrastructure::staging;
use crate::infrastructure::synth::{dockerfile, scripts, Synthesizer};
use crate::infrastructure::terraform::{
    credential_env, output_str, parse_outputs, plan_succeeded, provider_variables, Terraform,
    TerraformVars,
};

use super::options::{CancelToken, DeployOptions};
use super::result::DeployError;

const DB_PASSWORD_LEN: usize = 16;
/// Reported for container runs; registry push and service rollout are not performed
pub const PLACEHOLDER_LB_ADDRESS: &str = "[load-balancer-dns]";
const SLEEP_SLICE: Duration = Duration::from_millis(200);

type Outputs = BTreeMap<String, Value>;

/// Per-run paths, all under `<work_root>/<id>`
struct RunPaths {
    repo: PathBuf,
    terraform: PathBuf,
    deploy_script: PathBuf,
}

impl RunPaths {
    fn new(work_root: &Path, id: &DeploymentId) -> Self {
        let run = work_root.join(id.as_str());
        Self {
            repo: run.join("repo"),
            terraform: run.join("terraform"),
            deploy_script: run.join("deploy.sh"),
        }
    }
}

/// Values fixed for the whole run
struct RunContext<'a> {
    id: &'a DeploymentId,
    options: &'a DeployOptions,
    profile: &'a ApplicationProfile,
    plan: &'a InfrastructurePlan,
    paths: RunPaths,
    app_name: String,
}

/// Deploy use case - orchestrates one deployment run
///
/// Parameterized by its ports so the whole pipeline can run against a
/// scripted command runner and a stub probe.
pub struct DeployUseCase<R, P>
where
    R: CommandRunner,
    P: HealthProbe,
{
    runner: R,
    probe: P,
    synthesizer: Synthesizer,
    events: Arc<dyn DeployEventSink>,
    cancel: CancelToken,
}

impl<R, P> DeployUseCase<R, P>
where
    R: CommandRunner,
    P: HealthProbe,
{
    pub fn new(runner: R, probe: P) -> Self {
        Self {
            runner,
            probe,
            synthesizer: Synthesizer::new(),
            events: Arc::new(NoopEventSink),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute every stage and return the finalized record
    pub fn execute(
        &self,
        options: &DeployOptions,
        profile: &ApplicationProfile,
        plan: &InfrastructurePlan,
    ) -> DeploymentRecord {
        let id = options
            .deployment_id
            .clone()
            .unwrap_or_else(DeploymentId::generate);
        let mut record = RecordBuilder::start(id.clone());
        self.events.on_event(DeployEvent::Started {
            deployment_id: id.to_string(),
        });
        info!(deployment_id = %id, "starting deployment");
        record.log(format!("Deployment {} started", id));

        let outcome = check_topology(plan).and_then(|()| {
            let ctx = RunContext {
                id: &id,
                options,
                profile,
                plan,
                paths: RunPaths::new(&options.work_root, &id),
                app_name: id.resource_name(&options.app_name_prefix),
            };
            self.run_stages(&ctx, &mut record)
        });

        let finished = match outcome {
            Ok(info) => {
                record.log("Deployment completed");
                record.finish_success(info)
            }
            Err(DeployError::Cancelled) => record.cancel(),
            Err(err) => {
                warn!(error = %err, "deployment failed");
                record.fail(err.to_string())
            }
        };
        self.events.on_event(DeployEvent::Finished {
            status: finished.status().to_string(),
        });
        finished
    }

    fn run_stages(
        &self,
        ctx: &RunContext,
        record: &mut RecordBuilder,
    ) -> Result<DeploymentInfo, DeployError> {
        self.begin(Stage::Stage, record)?;
        let repo = self.stage_repository(ctx, record)?;

        self.begin(Stage::Build, record)?;
        self.build(ctx, &repo, record)?;

        self.begin(Stage::ContainerDescriptor, record)?;
        write_container_descriptor(ctx.profile, &repo, record)?;

        self.begin(Stage::Synthesize, record)?;
        let artifacts = self
            .synthesizer
            .synthesize_into(ctx.plan, ctx.profile, &ctx.paths.terraform)
            .map_err(DeployError::Synthesis)?;
        record.log(format!(
            "Wrote {} to {} ({})",
            artifacts.names().join(", "),
            ctx.paths.terraform.display(),
            artifacts.digest()
        ));

        self.begin(Stage::Provision, record)?;
        let terraform = self.provision(ctx, record)?;

        self.begin(Stage::Outputs, record)?;
        let outputs = self.read_outputs(&terraform, record)?;

        self.begin(Stage::Workload, record)?;
        let info = match &ctx.plan.compute_resources {
            ComputeResources::Vm { .. } => self.deploy_vm(ctx, &repo, &outputs, record)?,
            ComputeResources::EcsFargate { .. } | ComputeResources::CloudRun { .. } => {
                self.deploy_container(ctx, &repo, &outputs, record)?
            }
            other => return Err(DeployError::UnsupportedTopology(other.kind())),
        };

        match info.url.clone() {
            Some(url) => {
                self.begin(Stage::Verify, record)?;
                self.verify(ctx, &url, record)?;
            }
            None => self.skip(Stage::Verify, "no endpoint URL to probe", record),
        }
        Ok(info)
    }

    /// Cancellation check plus stage bookkeeping
    fn begin(&self, stage: Stage, record: &mut RecordBuilder) -> Result<(), DeployError> {
        self.check_cancel()?;
        info!(stage = %stage, "stage {}/{}", stage.position(), Stage::ALL.len());
        record.log(format!("[{}/{}] {}", stage.position(), Stage::ALL.len(), stage));
        self.events.on_event(DeployEvent::StageStarted { stage });
        Ok(())
    }

    fn skip(&self, stage: Stage, reason: &str, record: &mut RecordBuilder) {
        record.log(format!("[{}/{}] {} skipped: {}", stage.position(), Stage::ALL.len(), stage, reason));
        self.events.on_event(DeployEvent::StageSkipped {
            stage,
            reason: reason.to_string(),
        });
    }

    fn soft_fail(&self, record: &mut RecordBuilder, message: String) {
        warn!("{}", message);
        self.events.on_event(DeployEvent::Warning {
            message: message.clone(),
        });
        record.warn(message);
    }

    fn check_cancel(&self) -> Result<(), DeployError> {
        if self.cancel.is_cancelled() {
            Err(DeployError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep in short slices so cancellation is noticed promptly
    fn pause(&self, duration: Duration) -> Result<(), DeployError> {
        let deadline = Instant::now() + duration;
        loop {
            self.check_cancel()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    /// Run `op` up to `retry_attempts` times with `retry_delay` between tries
    fn retry<T>(
        &self,
        ctx: &RunContext,
        label: &str,
        mut op: impl FnMut() -> Result<T, DeployError>,
    ) -> Result<T, DeployError> {
        let attempts = ctx.options.timing.retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            self.check_cancel()?;
            match op() {
                Ok(value) => return Ok(value),
                Err(DeployError::Cancelled) => return Err(DeployError::Cancelled),
                Err(err) if attempt < attempts => {
                    warn!(attempt, attempts, error = %err, "{} failed, retrying", label);
                    self.pause(ctx.options.timing.retry_delay)?;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployError> {
        debug!(command = %spec.display(), "exec");
        Ok(self.runner.run(spec)?)
    }

    fn stage_repository(
        &self,
        ctx: &RunContext,
        record: &mut RecordBuilder,
    ) -> Result<PathBuf, DeployError> {
        let source = &ctx.options.source;
        let dest = &ctx.paths.repo;
        let repo = match source {
            RepoSource::Remote { url } => {
                self.retry(ctx, "git clone", || {
                    staging::clone(&self.runner, url, dest).map_err(DeployError::from)
                })?;
                dest.clone()
            }
            _ => staging::stage(&self.runner, source, dest)?,
        };
        record.log(format!("Staged {} into {}", source.describe(), repo.display()));
        Ok(repo)
    }

    fn build(
        &self,
        ctx: &RunContext,
        repo: &Path,
        record: &mut RecordBuilder,
    ) -> Result<(), DeployError> {
        let Some(command) = ctx.profile.build_command.as_deref() else {
            record.log("No build command; nothing to build");
            return Ok(());
        };
        record.log(format!("$ {}", command));
        let output = self.run(
            &CommandSpec::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(repo),
        )?;
        if !output.success() {
            return Err(DeployError::Build {
                command: command.to_string(),
                stderr: output.diagnostic().to_string(),
            });
        }
        record.log("Build succeeded");
        Ok(())
    }

    fn provision(
        &self,
        ctx: &RunContext,
        record: &mut RecordBuilder,
    ) -> Result<Terraform, DeployError> {
        let plan = ctx.plan;
        let (ssh_key, key_source) = ssh_public_key(ctx.options.ssh_key_path.as_deref());
        if key_source == SshKeySource::Placeholder {
            self.soft_fail(
                record,
                "no SSH public key found; hosts will not accept remote setup".to_string(),
            );
        }

        let vars = TerraformVars::new()
            .set("app_name", ctx.app_name.as_str())
            .set("ssh_public_key", ssh_key)
            .set("db_password", generate_password())
            .merge(provider_variables(
                plan.provider,
                &plan.region,
                ctx.options.gcp_project.as_deref(),
            ));

        let mut env = credential_env(plan.provider, |name| std::env::var(name).ok());
        if let (CloudProvider::Gcp, Some(project)) = (plan.provider, &ctx.options.gcp_project) {
            if !env.iter().any(|(k, _)| k == "GOOGLE_PROJECT") {
                env.push(("GOOGLE_PROJECT".to_string(), project.clone()));
            }
        }
        let terraform = Terraform::new(&ctx.options.terraform_bin, &ctx.paths.terraform).with_env(env);

        let init = terraform.init();
        record.log(format!("$ {}", init.display()));
        self.retry(ctx, "terraform init", || {
            let output = self.run(&init)?;
            if output.success() {
                Ok(())
            } else {
                Err(DeployError::Provision {
                    step: "init",
                    stderr: output.diagnostic().to_string(),
                })
            }
        })?;

        let plan_cmd = terraform.plan(&vars);
        record.log(format!("$ {}", plan_cmd.display()));
        let output = self.run(&plan_cmd)?;
        if !plan_succeeded(&output) {
            return Err(DeployError::Provision {
                step: "plan",
                stderr: output.diagnostic().to_string(),
            });
        }

        self.check_cancel()?;
        let apply = terraform.apply();
        record.log(format!("$ {}", apply.display()));
        let output = self.run(&apply)?;
        if !output.success() {
            return Err(DeployError::Provision {
                step: "apply",
                stderr: output.diagnostic().to_string(),
            });
        }
        record.log("Infrastructure provisioned");
        Ok(terraform)
    }

    fn read_outputs(
        &self,
        terraform: &Terraform,
        record: &mut RecordBuilder,
    ) -> Result<Outputs, DeployError> {
        let output = self.run(&terraform.output())?;
        if !output.success() {
            return Err(DeployError::Outputs(output.diagnostic().to_string()));
        }
        let outputs =
            parse_outputs(&output.stdout).map_err(|e| DeployError::Outputs(e.to_string()))?;
        record.log(format!(
            "Outputs: {}",
            if outputs.is_empty() {
                "none".to_string()
            } else {
                outputs.keys().cloned().collect::<Vec<_>>().join(", ")
            }
        ));
        Ok(outputs)
    }

    fn deploy_vm(
        &self,
        ctx: &RunContext,
        repo: &Path,
        outputs: &Outputs,
        record: &mut RecordBuilder,
    ) -> Result<DeploymentInfo, DeployError> {
        let port = ctx.profile.port;
        let lb_dns = output_str(outputs, "load_balancer_dns");
        let instance_ip = output_str(outputs, "instance_public_ip");

        let addressing = match (lb_dns, instance_ip) {
            (Some(dns), _) => Some(Addressing::LoadBalancerDns(dns.to_string())),
            (None, Some(ip)) => Some(Addressing::InstanceIp(ip.to_string())),
            (None, None) => None,
        };
        let url = match (lb_dns, instance_ip) {
            (Some(dns), _) => Some(format!("http://{}", dns)),
            (None, Some(ip)) => Some(format!("http://{}:{}", ip, port)),
            (None, None) => None,
        };
        let info = DeploymentInfo {
            target: TargetKind::Vm,
            url,
            port,
            addressing,
            image: None,
        };

        let Some(ip) = instance_ip else {
            self.soft_fail(
                record,
                "no instance address in infrastructure outputs; complete application setup manually"
                    .to_string(),
            );
            return Ok(info);
        };

        if let Err(reason) = self.setup_host(ctx, repo, ip, record)? {
            self.soft_fail(
                record,
                format!(
                    "remote setup failed: {}; infrastructure is provisioned, complete application setup manually",
                    reason
                ),
            );
        }
        Ok(info)
    }

    /// Outer error: cancellation only. Inner error: soft setup failure.
    fn setup_host(
        &self,
        ctx: &RunContext,
        repo: &Path,
        ip: &str,
        record: &mut RecordBuilder,
    ) -> Result<Result<(), String>, DeployError> {
        let timing = ctx.options.timing;
        let identity = match ssh_public_key(ctx.options.ssh_key_path.as_deref()).1 {
            SshKeySource::File(public) => private_key_for(&public),
            SshKeySource::Placeholder => None,
        };
        let host = RemoteHost::new(&ctx.options.ssh_user, ip).with_identity(identity);

        record.log(format!("Waiting {}s for {} to boot", timing.settle.as_secs(), ip));
        self.pause(timing.settle)?;

        let mut ready = false;
        for attempt in 1..=timing.readiness_attempts {
            self.check_cancel()?;
            match self.runner.run(&host.has_file(scripts::BOOTSTRAP_MARKER)) {
                Ok(output) if output.success() => {
                    ready = true;
                    break;
                }
                Ok(output) => debug!(attempt, detail = output.diagnostic(), "host not ready"),
                Err(err) => return Ok(Err(err.to_string())),
            }
            if attempt < timing.readiness_attempts {
                self.pause(timing.readiness_delay)?;
            }
        }
        if !ready {
            return Ok(Err(format!(
                "{} did not finish bootstrapping after {} attempts",
                ip, timing.readiness_attempts
            )));
        }
        record.log(format!("Host {} finished bootstrapping", ip));

        if ctx.options.rewrite_localhost {
            match staging::rewrite_localhost_urls(repo, ip) {
                Ok(count) => record.log(format!("Rewrote localhost URLs in {} file(s)", count)),
                Err(err) => return Ok(Err(format!("localhost rewrite failed: {}", err))),
            }
        }

        let script = scripts::deploy_script(ctx.profile, ctx.id.as_str(), &ctx.options.ssh_user);
        if let Err(err) = write_executable(&ctx.paths.deploy_script, script.as_bytes()) {
            return Ok(Err(format!("could not write deploy script: {}", err)));
        }

        let remote_repo = scripts::remote_staging_dir(ctx.id.as_str());
        let remote_script = scripts::remote_script_path(ctx.id.as_str());
        let steps = [
            ("copy application files", host.upload_dir(repo, &remote_repo)),
            (
                "copy deploy script",
                host.upload_file(&ctx.paths.deploy_script, &remote_script),
            ),
            ("run deploy script", host.run_script(&remote_script)),
        ];
        for (label, spec) in steps {
            self.check_cancel()?;
            record.log(format!("Remote: {}", label));
            match self.runner.run(&spec) {
                Ok(output) if output.success() => {}
                Ok(output) => return Ok(Err(format!("{}: {}", label, output.diagnostic()))),
                Err(err) => return Ok(Err(format!("{}: {}", label, err))),
            }
        }
        record.log(format!("Application installed on {}", ip));
        Ok(Ok(()))
    }

    fn deploy_container(
        &self,
        ctx: &RunContext,
        repo: &Path,
        outputs: &Outputs,
        record: &mut RecordBuilder,
    ) -> Result<DeploymentInfo, DeployError> {
        let image = format!("{}:latest", ctx.app_name);
        let build = CommandSpec::new("docker")
            .args(["build", "-t", image.as_str(), "."])
            .current_dir(repo);
        record.log(format!("$ {}", build.display()));
        let output = self.run(&build)?;
        if !output.success() {
            return Err(DeployError::ContainerBuild(output.diagnostic().to_string()));
        }
        record.log(format!("Built image {}", image));

        let service = ctx.plan.compute_resources.label();
        record.log(format!(
            "Would push {} to a registry and roll it out to {} (not performed)",
            image, service
        ));

        let address = output_str(outputs, "load_balancer_dns").unwrap_or(PLACEHOLDER_LB_ADDRESS);
        Ok(DeploymentInfo {
            target: TargetKind::Container,
            url: None,
            port: ctx.profile.port,
            addressing: Some(Addressing::LoadBalancerDns(address.to_string())),
            image: Some(image),
        })
    }

    fn verify(
        &self,
        ctx: &RunContext,
        url: &str,
        record: &mut RecordBuilder,
    ) -> Result<(), DeployError> {
        let timing = ctx.options.timing;
        let mut last = String::from("no attempt made");
        for attempt in 1..=timing.health_attempts {
            self.check_cancel()?;
            match self.probe.probe(url) {
                Ok(status) if (200..300).contains(&status) => {
                    record.log(format!("Health check passed: {} returned HTTP {}", url, status));
                    return Ok(());
                }
                Ok(status) => last = format!("HTTP {}", status),
                Err(err) => last = err.to_string(),
            }
            debug!(attempt, url, last = %last, "health check attempt failed");
            if attempt < timing.health_attempts {
                self.pause(timing.health_delay)?;
            }
        }
        self.soft_fail(
            record,
            format!(
                "health check of {} did not succeed after {} attempts ({}); the application may still be starting",
                url, timing.health_attempts, last
            ),
        );
        Ok(())
    }
}

/// Reject topologies that have no workload path
pub fn check_topology(plan: &InfrastructurePlan) -> Result<(), DeployError> {
    match &plan.compute_resources {
        ComputeResources::Vm { .. }
        | ComputeResources::EcsFargate { .. }
        | ComputeResources::CloudRun { .. } => Ok(()),
        other => Err(DeployError::UnsupportedTopology(other.kind())),
    }
}

fn write_container_descriptor(
    profile: &ApplicationProfile,
    repo: &Path,
    record: &mut RecordBuilder,
) -> Result<(), DeployError> {
    let path = repo.join(dockerfile::DOCKERFILE);
    if path.exists() {
        record.log("Using the repository's Dockerfile");
        return Ok(());
    }
    crate::infrastructure::fs::write_atomic(&path, dockerfile::render(profile).as_bytes())
        .map_err(DeployError::ContainerDescriptor)?;
    record.log("Generated Dockerfile");
    Ok(())
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DB_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
