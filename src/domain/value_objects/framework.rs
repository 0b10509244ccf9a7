//! Framework and application-type value objects

use serde::{Deserialize, Serialize};

/// Web framework detected in a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Flask,
    Django,
    Fastapi,
    Express,
    Nextjs,
    React,
    Vue,
    Angular,
    Rails,
    Laravel,
    Spring,
}

impl Framework {
    /// Candidate order; earlier entries win score ties
    pub const ALL: [Framework; 11] = [
        Framework::Flask,
        Framework::Django,
        Framework::Fastapi,
        Framework::Express,
        Framework::Nextjs,
        Framework::React,
        Framework::Vue,
        Framework::Angular,
        Framework::Rails,
        Framework::Laravel,
        Framework::Spring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Flask => "flask",
            Framework::Django => "django",
            Framework::Fastapi => "fastapi",
            Framework::Express => "express",
            Framework::Nextjs => "nextjs",
            Framework::React => "react",
            Framework::Vue => "vue",
            Framework::Angular => "angular",
            Framework::Rails => "rails",
            Framework::Laravel => "laravel",
            Framework::Spring => "spring",
        }
    }

    /// Detection patterns, matched against paths and source contents
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Framework::Flask => &["from flask import", "Flask(__name__)", "requirements.txt"],
            Framework::Django => &["django", "manage.py", "settings.py", "wsgi.py"],
            Framework::Fastapi => &["from fastapi import", "FastAPI()", "uvicorn"],
            Framework::Express => &["express", "app.listen", "package.json"],
            Framework::Nextjs => &["next.config", "pages/", "package.json"],
            Framework::React => &["react", "react-dom", "package.json", "src/App"],
            Framework::Vue => &["vue", "package.json", "src/main"],
            Framework::Angular => &["@angular", "angular.json", "package.json"],
            Framework::Rails => &["Gemfile", "config.ru", "app/controllers"],
            Framework::Laravel => &["composer.json", "artisan", "app/Http"],
            Framework::Spring => &["pom.xml", "build.gradle", "src/main/java"],
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Framework::Flask => 5000,
            Framework::Django | Framework::Fastapi | Framework::Laravel => 8000,
            Framework::Express | Framework::Nextjs | Framework::React | Framework::Rails => 3000,
            Framework::Vue | Framework::Spring => 8080,
            Framework::Angular => 4200,
        }
    }

    /// Single-process web frameworks that run comfortably on one VM
    pub fn is_simple_web(&self) -> bool {
        matches!(self, Framework::Flask | Framework::Fastapi | Framework::Express)
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application category
///
/// Serializes as a bare string: `"generic"` or the framework name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    #[default]
    Generic,
    #[serde(untagged)]
    Framework(Framework),
}

impl AppType {
    pub fn from_framework(framework: Option<Framework>) -> Self {
        framework.map_or(AppType::Generic, AppType::Framework)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AppType::Generic)
    }

    pub fn framework(&self) -> Option<Framework> {
        match self {
            AppType::Generic => None,
            AppType::Framework(fw) => Some(*fw),
        }
    }
}

impl std::fmt::Display for AppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppType::Generic => f.write_str("generic"),
            AppType::Framework(fw) => fw.fmt(f),
        }
    }
}
