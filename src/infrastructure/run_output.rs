//! Persisted run output

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::value_objects::DeploymentId;
use crate::error::AutodeployResult;
use crate::infrastructure::fs::write_atomic;

pub const ANALYSIS_FILE: &str = "analysis.json";

/// `deployment-<id>.json`
pub fn deployment_file_name(id: &DeploymentId) -> String {
    format!("deployment-{}.json", id)
}

/// Pretty JSON, newline-terminated, written atomically to `dir/name`
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> AutodeployResult<PathBuf> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    let path = dir.join(name);
    write_atomic(&path, body.as_bytes())?;
    Ok(path)
}
