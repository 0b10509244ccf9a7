//! Plain-text views for `analyze`, `plan` and `deploy`

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use autodeploy::domain::entities::{
    ApplicationProfile, ComputeResources, DeploymentRecord, DeploymentRequirements,
    DeploymentStatus, InfrastructurePlan,
};

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {:<14} {}", label, value);
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn render_profile(profile: &ApplicationProfile) -> String {
    let mut out = String::from("Application profile\n");
    row(&mut out, "Type", &profile.app_type);
    row(&mut out, "Framework", profile.display_kind());
    row(&mut out, "Language", profile.language);
    row(&mut out, "Entry point", or_none(profile.entry_point.as_deref()));
    row(&mut out, "Build", or_none(profile.build_command.as_deref()));
    row(&mut out, "Start", or_none(profile.start_command.as_deref()));
    row(&mut out, "Port", profile.port);
    row(
        &mut out,
        "Database",
        profile
            .database_type
            .map_or("none".to_string(), |db| db.to_string()),
    );
    row(&mut out, "Redis", if profile.requires_redis { "yes" } else { "no" });
    if !profile.environment_vars.is_empty() {
        row(&mut out, "Env vars", profile.environment_vars.join(", "));
    }
    row(&mut out, "Confidence", format!("{:.0}%", profile.confidence_score * 100.0));
    out
}

pub fn render_requirements(requirements: &DeploymentRequirements) -> String {
    let mut out = String::from("Requirements\n");
    row(&mut out, "Provider", requirements.cloud_provider());
    row(&mut out, "Topology", requirements.deployment_type());
    row(&mut out, "Region", requirements.region_or_default());
    let scaling = requirements.scaling();
    row(
        &mut out,
        "Scaling",
        format!(
            "{}-{}{}",
            scaling.min(),
            scaling.max(),
            if scaling.auto() { " (auto)" } else { "" }
        ),
    );
    if let Some(domain) = requirements.custom_domain() {
        row(&mut out, "Domain", domain);
    }
    out
}

fn describe_compute(compute: &ComputeResources) -> String {
    match compute {
        ComputeResources::Vm {
            instance_type,
            count,
            max_count,
            auto_scaling,
            ..
        } if *auto_scaling => format!("vm {} x{}-{} (auto-scaling)", instance_type, count, max_count),
        ComputeResources::Vm {
            instance_type,
            count,
            ..
        } => format!("vm {} x{}", instance_type, count),
        ComputeResources::EcsFargate {
            cpu,
            memory,
            count,
            ..
        } => format!("ecs_fargate {} cpu / {} MiB x{}", cpu, memory, count),
        ComputeResources::CloudRun {
            cpu,
            memory,
            min_instances,
            max_instances,
        } => format!("cloud_run {} cpu / {} x{}-{}", cpu, memory, min_instances, max_instances),
        ComputeResources::Kubernetes {
            service,
            node_count,
            node_type,
            ..
        } => format!("{} {} x{}", service, node_type, node_count),
        ComputeResources::Serverless {
            service,
            memory_mb,
            timeout_secs,
        } => format!("{} {} MB / {}s", service, memory_mb, timeout_secs),
    }
}

pub fn render_plan(plan: &InfrastructurePlan) -> String {
    let mut out = String::from("Infrastructure plan\n");
    row(&mut out, "Provider", format!("{} ({})", plan.provider, plan.region));
    row(&mut out, "Compute", describe_compute(&plan.compute_resources));

    let net = &plan.networking;
    let mut network = vec!["vpc", "public subnet"];
    if net.private_subnet {
        network.push("private subnet");
    }
    if net.load_balancer {
        network.push("load balancer");
    }
    if net.ssl {
        network.push("tls");
    }
    row(&mut out, "Network", network.join(", "));
    if let Some(domain) = &net.custom_domain {
        row(&mut out, "Domain", domain);
    }
    match plan.database.spec() {
        Some(db) => row(
            &mut out,
            "Database",
            format!("{} {} on {}", db.engine, db.version, db.instance_class),
        ),
        None => row(&mut out, "Database", "none"),
    }
    if plan.storage.object_storage {
        row(&mut out, "Storage", "object storage bucket");
    }
    row(&mut out, "Cost", &plan.estimated_cost);
    let _ = writeln!(out, "\n  {}", plan.reasoning);
    out
}

pub fn render_artifacts(dir: &Path, files: &[PathBuf]) -> String {
    let mut out = format!("Infrastructure code written to {}\n", dir.display());
    for file in files {
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let _ = writeln!(out, "  {}", name);
    }
    out
}

pub fn render_record(record: &DeploymentRecord) -> String {
    let mut out = String::new();
    let headline = match record.status() {
        DeploymentStatus::Success => "Deployment succeeded",
        DeploymentStatus::Failed => "Deployment failed",
        DeploymentStatus::Cancelled => "Deployment cancelled",
    };
    let _ = writeln!(out, "{} ({})", headline, record.deployment_id());
    if let Some(info) = record.info() {
        if let Some(url) = &info.url {
            row(&mut out, "URL", url);
        }
        if let Some(addressing) = &info.addressing {
            row(&mut out, "Address", addressing.host());
        }
        if let Some(image) = &info.image {
            row(&mut out, "Image", image);
        }
    }
    if let Some(error) = record.error() {
        row(&mut out, "Error", error);
    }
    for warning in record.warnings() {
        let _ = writeln!(out, "  ! {}", warning);
    }
    row(
        &mut out,
        "Duration",
        format!(
            "{}s",
            (record.finished_at() - record.started_at()).num_seconds()
        ),
    );
    out
}
