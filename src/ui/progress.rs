//! Live stage progress during `deploy`

use std::io::{self, Write};
use std::sync::Mutex;

use autodeploy::domain::ports::{DeployEvent, DeployEventSink, Stage};
use serde_json::{json, Value};

use crate::ui::json::write_event;

/// Prints deploy events: text lines on stderr, or NDJSON on stdout
pub struct ProgressSink {
    json: bool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ProgressSink {
    pub fn new(json: bool) -> Self {
        let out: Box<dyn Write + Send> = if json {
            Box::new(io::stdout())
        } else {
            Box::new(io::stderr())
        };
        Self::with_writer(json, out)
    }

    pub fn with_writer(json: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            json,
            out: Mutex::new(out),
        }
    }
}

fn to_json(event: &DeployEvent) -> Value {
    match event {
        DeployEvent::Started { deployment_id } => {
            json!({"event": "start", "command": "deploy", "deployment_id": deployment_id})
        }
        DeployEvent::StageStarted { stage } => json!({
            "event": "stage",
            "index": stage.position(),
            "total": Stage::ALL.len(),
            "title": stage.title(),
        }),
        DeployEvent::StageSkipped { stage, reason } => json!({
            "event": "stage_skipped",
            "index": stage.position(),
            "title": stage.title(),
            "reason": reason,
        }),
        DeployEvent::Warning { message } => json!({"event": "warning", "message": message}),
        DeployEvent::Finished { status } => json!({"event": "finished", "status": status}),
    }
}

fn to_text(event: &DeployEvent) -> Option<String> {
    match event {
        DeployEvent::Started { deployment_id } => Some(format!("Deployment {}", deployment_id)),
        DeployEvent::StageStarted { stage } => Some(format!(
            "[{}/{}] {}...",
            stage.position(),
            Stage::ALL.len(),
            stage.title()
        )),
        DeployEvent::StageSkipped { stage, reason } => Some(format!(
            "[{}/{}] {} skipped ({})",
            stage.position(),
            Stage::ALL.len(),
            stage.title(),
            reason
        )),
        DeployEvent::Warning { message } => Some(format!("  warning: {}", message)),
        // the summary view reports the outcome
        DeployEvent::Finished { .. } => None,
    }
}

impl DeployEventSink for ProgressSink {
    fn on_event(&self, event: DeployEvent) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = if self.json {
            write_event(&mut *out, &to_json(&event))
        } else {
            match to_text(&event) {
                Some(line) => writeln!(out, "{}", line),
                None => Ok(()),
            }
        };
        let _ = out.flush();
    }
}
