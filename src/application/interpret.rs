//! Intent Interpreter
//!
//! Two tiers: an optional language backend, then the deterministic
//! [`RuleInterpreter`]. Any backend failure (transport, missing JSON,
//! unknown enum value) falls through to the rules and is never surfaced.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::entities::{
    ApplicationProfile, DeploymentRequirements, RequirementsDraft, ScalingPolicy,
};
use crate::domain::ports::LanguageBackend;
use crate::domain::services::RuleInterpreter;
use crate::domain::value_objects::{CloudProvider, DeploymentType};
use crate::error::{AutodeployError, AutodeployResult};

/// Shortest description worth interpreting
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Reject descriptions too short to carry any intent
pub fn validate_description(description: &str) -> AutodeployResult<&str> {
    let trimmed = description.trim();
    let length = trimmed.chars().count();
    if length < MIN_DESCRIPTION_CHARS {
        return Err(AutodeployError::DescriptionTooShort {
            length,
            minimum: MIN_DESCRIPTION_CHARS,
        });
    }
    Ok(trimmed)
}

/// Why a backend reply could not be used
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("no JSON object in reply")]
    NoJson,

    #[error("reply JSON is invalid: {0}")]
    InvalidJson(String),

    #[error("reply JSON is not an object")]
    NotAnObject,

    #[error("unknown cloud provider '{0}'")]
    UnknownProvider(String),

    #[error("unknown deployment type '{0}'")]
    UnknownTopology(String),
}

/// Turns free text plus a profile into deployment requirements
pub struct IntentInterpreter {
    backend: Option<Box<dyn LanguageBackend>>,
    rules: RuleInterpreter,
}

impl IntentInterpreter {
    /// Interpreter without a backend: rules only
    pub fn rule_based() -> Self {
        Self {
            backend: None,
            rules: RuleInterpreter::new(),
        }
    }

    pub fn with_backend(backend: Box<dyn LanguageBackend>) -> Self {
        Self {
            backend: Some(backend),
            rules: RuleInterpreter::new(),
        }
    }

    pub fn from_backend(backend: Option<Box<dyn LanguageBackend>>) -> Self {
        match backend {
            Some(backend) => Self::with_backend(backend),
            None => Self::rule_based(),
        }
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    pub fn interpret(
        &self,
        description: &str,
        profile: &ApplicationProfile,
    ) -> DeploymentRequirements {
        if let Some(backend) = self.backend.as_deref() {
            match self.interpret_with(backend, description, profile) {
                Ok(requirements) => {
                    info!(backend = backend.name(), "interpreted requirements with backend");
                    return requirements;
                }
                Err(reason) => {
                    warn!(backend = backend.name(), %reason, "backend interpretation failed, using rules");
                }
            }
        }
        debug!("interpreting requirements with rules");
        self.rules.interpret(description, profile)
    }

    fn interpret_with(
        &self,
        backend: &dyn LanguageBackend,
        description: &str,
        profile: &ApplicationProfile,
    ) -> Result<DeploymentRequirements, String> {
        let prompt = build_prompt(description, profile);
        let reply = backend.complete(&prompt).map_err(|e| e.to_string())?;
        ingest_reply(&reply, description).map_err(|e| e.to_string())
    }
}

/// Instruction sent to the backend
pub fn build_prompt(description: &str, profile: &ApplicationProfile) -> String {
    format!(
        r#"You are a DevOps expert. Parse the following deployment request and application analysis into structured deployment requirements.

Deployment Request: "{description}"

Application Analysis:
{summary}

Extract and return ONLY a JSON object with these fields:
{{
  "cloud_provider": "aws|gcp|azure",
  "deployment_type": "serverless|vm|container|kubernetes",
  "region": "region name or null",
  "instance_type": "instance type or null",
  "scaling": {{"min": 1, "max": 3, "auto": true}},
  "custom_domain": "domain or null",
  "ssl_required": true|false,
  "additional_services": ["service1", "service2"]
}}

Rules:
- If no cloud provider specified, default to "aws"
- Choose deployment_type based on app complexity:
  * Simple apps (Flask, Express) -> "vm" or "container"
  * Complex apps with DB -> "container"
  * Microservices -> "kubernetes"
- Default region: us-east-1 for AWS, us-central1 for GCP, East US for Azure
- Instance type: smallest size for small apps, one size up for medium
- SSL required if domain mentioned or production deployment
- Additional services: database, redis, load_balancer, etc.

Return ONLY the JSON, no explanation."#,
        description = description,
        summary = profile.condensed_summary(),
    )
}

/// First balanced `{...}` span in `text`, ignoring braces inside strings
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Validate and coerce a backend reply into requirements
///
/// Unknown provider or topology values reject the reply. Out-of-range
/// scaling bounds are repaired and a domain forces TLS on. The description
/// is always the caller's, never the backend's.
pub fn ingest_reply(reply: &str, description: &str) -> Result<DeploymentRequirements, IngestError> {
    let json = extract_json_object(reply).ok_or(IngestError::NoJson)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| IngestError::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(IngestError::NotAnObject)?;

    let cloud_provider = match optional_string(object, "cloud_provider") {
        Some(raw) => raw
            .parse::<CloudProvider>()
            .map_err(|_| IngestError::UnknownProvider(raw))?,
        None => CloudProvider::default(),
    };
    let deployment_type = match optional_string(object, "deployment_type") {
        Some(raw) => raw
            .parse::<DeploymentType>()
            .map_err(|_| IngestError::UnknownTopology(raw))?,
        None => DeploymentType::default(),
    };

    Ok(DeploymentRequirements::new(RequirementsDraft {
        cloud_provider,
        deployment_type,
        region: optional_string(object, "region"),
        instance_type: optional_string(object, "instance_type"),
        scaling: scaling(object.get("scaling")),
        custom_domain: optional_string(object, "custom_domain"),
        ssl_required: object
            .get("ssl_required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        additional_services: object
            .get("additional_services")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        raw_description: description.to_string(),
    }))
}

/// String field, treating JSON null, "", and "null" as absent
fn optional_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    let raw = object.get(key)?.as_str()?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(raw.to_string())
    }
}

fn scaling(value: Option<&Value>) -> ScalingPolicy {
    let Some(object) = value.and_then(Value::as_object) else {
        return ScalingPolicy::fixed();
    };
    let bound = |key: &str| {
        object
            .get(key)
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
            .map(|n| n.min(u64::from(u32::MAX)) as u32)
    };
    let min = bound("min").unwrap_or(1);
    let max = bound("max").unwrap_or(min);
    let auto = object.get("auto").and_then(Value::as_bool).unwrap_or(false);
    ScalingPolicy::new(min, max, auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::BackendError;
    use crate::domain::value_objects::{AppType, Framework, Language};

    struct CannedBackend(Result<String, ()>);

    impl LanguageBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            self.0
                .clone()
                .map_err(|_| BackendError::Transport("connection refused".to_string()))
        }
    }

    fn flask_profile() -> ApplicationProfile {
        ApplicationProfile {
            app_type: AppType::Framework(Framework::Flask),
            framework: Some(Framework::Flask),
            language: Language::Python,
            port: 5000,
            ..Default::default()
        }
    }

    #[test]
    fn description_length_is_checked_after_trimming() {
        assert!(validate_description("deploy it on aws").is_ok());
        let err = validate_description("   short   ").unwrap_err();
        assert!(matches!(
            err,
            AutodeployError::DescriptionTooShort { length: 5, minimum: 10 }
        ));
    }

    #[test]
    fn json_span_skips_braces_in_strings() {
        let text = r#"Sure! {"custom_domain": "a}b.com", "scaling": {"min": 1}} trailing {x}"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"custom_domain": "a}b.com", "scaling": {"min": 1}}"#)
        );
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{ unclosed"), None);
    }

    #[test]
    fn reply_is_coerced_on_ingest() {
        let reply = r#"```json
{"cloud_provider": "gcp", "deployment_type": "vm", "region": null,
 "scaling": {"min": 0, "max": -2, "auto": false},
 "custom_domain": "app.example.com", "ssl_required": false,
 "additional_services": ["redis", 7]}
```"#;
        let reqs = ingest_reply(reply, "caller text").unwrap();
        assert_eq!(reqs.cloud_provider(), CloudProvider::Gcp);
        assert_eq!(reqs.scaling(), ScalingPolicy::new(1, 1, false));
        assert!(reqs.ssl_required());
        assert_eq!(reqs.region(), None);
        assert_eq!(reqs.additional_services(), ["redis"]);
        assert_eq!(reqs.raw_description(), "caller text");
    }

    #[test]
    fn reply_settings_cannot_inject_infrastructure_code() {
        use crate::domain::services::PolicyEngine;
        use crate::infrastructure::Synthesizer;

        let reply = serde_json::json!({
            "cloud_provider": "aws",
            "deployment_type": "vm",
            "region": "us-east-1\"\n}\nresource \"aws_iam_user\" \"x\" {\n  name = \"pwn",
            "instance_type": "t2.micro\" }",
        })
        .to_string();
        let reqs = ingest_reply(&reply, "caller text").unwrap();
        assert_eq!(reqs.region(), None);
        assert_eq!(reqs.instance_type(), None);

        let profile = flask_profile();
        let plan = PolicyEngine::new().decide(&profile, &reqs);
        let artifacts = Synthesizer::new().synthesize(&plan, &profile);
        let variables = artifacts.get("variables.tf").unwrap();
        assert!(!variables.contains("aws_iam_user"));
        assert!(variables.contains(r#"default     = "us-east-1""#));
        assert!(!artifacts.get("main.tf").unwrap().contains("aws_iam_user"));
    }

    #[test]
    fn unknown_provider_rejects_reply() {
        let err = ingest_reply(r#"{"cloud_provider": "heroku"}"#, "x").unwrap_err();
        assert_eq!(err, IngestError::UnknownProvider("heroku".to_string()));

        let err = ingest_reply(r#"{"deployment_type": "mainframe"}"#, "x").unwrap_err();
        assert_eq!(err, IngestError::UnknownTopology("mainframe".to_string()));
    }

    #[test]
    fn backend_reply_is_used_when_valid() {
        let backend = CannedBackend(Ok(
            r#"{"cloud_provider":"azure","deployment_type":"kubernetes","scaling":{"min":2,"max":5,"auto":true}}"#
                .to_string(),
        ));
        let interpreter = IntentInterpreter::with_backend(Box::new(backend));
        let reqs = interpreter.interpret("deploy small, no scaling", &flask_profile());

        assert_eq!(interpreter.backend_name(), Some("canned"));
        assert_eq!(reqs.cloud_provider(), CloudProvider::Azure);
        assert_eq!(reqs.deployment_type(), DeploymentType::Kubernetes);
        assert_eq!(reqs.scaling().min(), 2);
    }

    #[test]
    fn backend_failure_falls_back_to_rules() {
        let rules = IntentInterpreter::rule_based().interpret("deploy small, no scaling", &flask_profile());

        for backend in [
            CannedBackend(Err(())),
            CannedBackend(Ok("I cannot help with that".to_string())),
            CannedBackend(Ok(r#"{"cloud_provider": "digitalocean"}"#.to_string())),
        ] {
            let interpreter = IntentInterpreter::with_backend(Box::new(backend));
            let reqs = interpreter.interpret("deploy small, no scaling", &flask_profile());
            assert_eq!(reqs, rules);
        }
    }

    #[test]
    fn prompt_embeds_description_and_summary() {
        let prompt = build_prompt("deploy on gcp", &flask_profile());
        assert!(prompt.contains(r#"Deployment Request: "deploy on gcp""#));
        assert!(prompt.contains("- Framework: flask"));
        assert!(prompt.contains("- Port: 5000"));
    }
}
