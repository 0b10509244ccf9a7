//! Application profile entity
//!
//! Structured summary of a repository's technology and runtime needs,
//! produced once by the signal extractor and never mutated afterward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AppType, DatabaseKind, Framework, Language};

/// Weight of each independent confidence signal
pub const CATEGORY_WEIGHT: f64 = 0.3;
pub const FRAMEWORK_WEIGHT: f64 = 0.3;
pub const ENTRY_POINT_WEIGHT: f64 = 0.2;
pub const MANIFEST_WEIGHT: f64 = 0.2;

/// The four signals the confidence score is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfidenceSignals {
    pub category_known: bool,
    pub framework_known: bool,
    pub entry_point_known: bool,
    pub manifest_present: bool,
}

impl ConfidenceSignals {
    /// Weighted sum of the signals, capped at 1.0
    pub fn score(&self) -> f64 {
        let weighted = [
            (self.category_known, CATEGORY_WEIGHT),
            (self.framework_known, FRAMEWORK_WEIGHT),
            (self.entry_point_known, ENTRY_POINT_WEIGHT),
            (self.manifest_present, MANIFEST_WEIGHT),
        ];
        let total: f64 = weighted
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, weight)| weight)
            .sum();
        total.min(1.0)
    }
}

/// Structured application profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationProfile {
    pub app_type: AppType,
    pub framework: Option<Framework>,
    pub language: Language,
    /// Ecosystem name → declared package names, in manifest order
    pub dependencies: BTreeMap<String, Vec<String>>,
    pub entry_point: Option<String>,
    pub build_command: Option<String>,
    pub start_command: Option<String>,
    pub port: u16,
    /// Sorted, de-duplicated environment variable names
    pub environment_vars: Vec<String>,
    pub requires_database: bool,
    pub database_type: Option<DatabaseKind>,
    pub requires_redis: bool,
    pub dockerfile_present: bool,
    pub docker_compose_present: bool,
    pub static_files: bool,
    pub confidence_score: f64,
}

impl ApplicationProfile {
    /// Whether the repository already ships container definitions
    pub fn requires_docker(&self) -> bool {
        self.dockerfile_present || self.docker_compose_present
    }

    /// Framework name, or the application category when none was detected
    pub fn display_kind(&self) -> String {
        self.framework
            .map(|fw| fw.to_string())
            .unwrap_or_else(|| self.app_type.to_string())
    }

    /// One-paragraph summary used when prompting the language backend
    pub fn condensed_summary(&self) -> String {
        format!(
            "- Type: {}\n- Framework: {}\n- Language: {}\n- Requires Database: {}\n- Database Type: {}\n- Port: {}",
            self.app_type,
            self.framework.map_or("none".to_string(), |fw| fw.to_string()),
            self.language,
            self.requires_database,
            self.database_type.map_or("none".to_string(), |db| db.to_string()),
            self.port,
        )
    }
}

impl Default for ApplicationProfile {
    fn default() -> Self {
        Self {
            app_type: AppType::Generic,
            framework: None,
            language: Language::Unknown,
            dependencies: BTreeMap::new(),
            entry_point: None,
            build_command: None,
            start_command: None,
            port: 8000,
            environment_vars: Vec::new(),
            requires_database: false,
            database_type: None,
            requires_redis: false,
            dockerfile_present: false,
            docker_compose_present: false,
            static_files: false,
            confidence_score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_all_signals_is_capped_at_one() {
        let signals = ConfidenceSignals {
            category_known: true,
            framework_known: true,
            entry_point_known: true,
            manifest_present: true,
        };
        let score = signals.score();
        assert!((score - 1.0).abs() < 1e-9);
        assert!(score <= 1.0);
    }

    #[test]
    fn confidence_no_signals_is_zero() {
        assert_eq!(ConfidenceSignals::default().score(), 0.0);
    }

    #[test]
    fn confidence_manifest_only() {
        let signals = ConfidenceSignals {
            manifest_present: true,
            ..Default::default()
        };
        assert!((signals.score() - MANIFEST_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn condensed_summary_mentions_port_and_database() {
        let profile = ApplicationProfile {
            framework: Some(Framework::Django),
            app_type: AppType::Framework(Framework::Django),
            requires_database: true,
            database_type: Some(DatabaseKind::Postgresql),
            ..Default::default()
        };
        let summary = profile.condensed_summary();
        assert!(summary.contains("Framework: django"));
        assert!(summary.contains("Database Type: postgresql"));
        assert!(summary.contains("Port: 8000"));
    }
}
