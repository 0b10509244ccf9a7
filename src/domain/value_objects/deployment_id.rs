//! Deployment identity value object
//!
//! A time-based prefix plus a random suffix: `20261019142311-k3j9xa`.
//! The identity scopes the working directory and every external resource
//! name derived for a run, so repeated runs never collide.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SUFFIX_LEN: usize = 6;
const PREFIX_MAX_LEN: usize = 6;
/// Length of a generated identity; caller-provided ones may not exceed it
const ID_MAX_LEN: usize = 21;
const DEFAULT_PREFIX: &str = "ad";

/// Unique identity of one orchestration run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Generate a fresh identity from the current time
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::thread_rng())
    }

    /// Generate an identity for a given instant with the given RNG
    pub fn generate_at<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: String = rng
            .sample_iter(&Alphanumeric)
            .map(|b| (b as char).to_ascii_lowercase())
            .take(SUFFIX_LEN)
            .collect();
        Self(format!("{}-{}", now.format("%Y%m%d%H%M%S"), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cloud resource name for this run: `<prefix>-<id>`
    ///
    /// The prefix is reduced to lowercase alphanumerics, must start with a
    /// letter, and is capped so derived names (`<name>-alb`, `<name>-tg`)
    /// stay within the tightest provider limits.
    pub fn resource_name(&self, prefix: &str) -> String {
        let cleaned: String = prefix
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .take(PREFIX_MAX_LEN)
            .collect();
        let prefix = match cleaned.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => cleaned.as_str(),
            _ => DEFAULT_PREFIX,
        };
        format!("{}-{}", prefix, self.0)
    }
}

impl FromStr for DeploymentId {
    type Err = String;

    /// Accept a caller-provided identity (lowercase alphanumerics and
    /// single inner `-`; RDS identifiers reject `--`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= ID_MAX_LEN
            && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !s.starts_with('-')
            && !s.ends_with('-')
            && !s.contains("--");
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(format!(
                "invalid deployment id '{}': use 1-21 lowercase letters, digits, or single inner '-'",
                s
            ))
        }
    }
}

impl TryFrom<String> for DeploymentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeploymentId> for String {
    fn from(id: DeploymentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
