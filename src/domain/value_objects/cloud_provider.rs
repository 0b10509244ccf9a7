//! Cloud provider value object - which cloud the deployment targets

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AutodeployError;

/// Supported cloud providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    /// Amazon Web Services
    #[default]
    Aws,
    /// Google Cloud Platform
    Gcp,
    /// Microsoft Azure
    Azure,
}

impl CloudProvider {
    /// All providers, in keyword-matching priority order
    pub const ALL: [CloudProvider; 3] = [CloudProvider::Aws, CloudProvider::Gcp, CloudProvider::Azure];

    /// Lowercase identifier used in configuration and IaC variable names
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Azure => "azure",
        }
    }

    /// Region used when the description names none
    pub fn default_region(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "us-east-1",
            CloudProvider::Gcp => "us-central1",
            CloudProvider::Azure => "East US",
        }
    }

    /// Whether this provider gets the full, flag-driven IaC template
    pub fn is_primary(&self) -> bool {
        matches!(self, CloudProvider::Aws)
    }
}

impl FromStr for CloudProvider {
    type Err = AutodeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aws" | "amazon" => Ok(CloudProvider::Aws),
            "gcp" | "google" => Ok(CloudProvider::Gcp),
            "azure" => Ok(CloudProvider::Azure),
            _ => Err(AutodeployError::InvalidProvider {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
