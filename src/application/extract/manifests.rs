//! Dependency manifest parsing
//!
//! Each manifest yields an explicit [`ManifestOutcome`]. A missing or
//! malformed manifest contributes no dependencies but never aborts a scan.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::index::RepoIndex;

static GEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*gem\s+['"]([^'"]+)['"]"#).expect("gem pattern is valid")
});

/// Result of looking for one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome<T> {
    Parsed(T),
    Missing,
    Malformed(String),
}

impl<T> ManifestOutcome<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            ManifestOutcome::Parsed(value) => Some(value),
            _ => None,
        }
    }

    /// The file exists, whether or not it parsed
    pub fn is_present(&self) -> bool {
        !matches!(self, ManifestOutcome::Missing)
    }
}

/// Declared names from a `package.json`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageJson {
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub scripts: Vec<String>,
}

#[derive(Deserialize)]
struct RawPackageJson {
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    scripts: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawComposerJson {
    #[serde(default)]
    require: serde_json::Map<String, serde_json::Value>,
}

/// Outcomes for every recognized manifest at the repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifests {
    pub requirements_txt: ManifestOutcome<Vec<String>>,
    pub pipfile: ManifestOutcome<Vec<String>>,
    pub package_json: ManifestOutcome<PackageJson>,
    pub gemfile: ManifestOutcome<Vec<String>>,
    pub composer_json: ManifestOutcome<Vec<String>>,
}

impl Manifests {
    pub fn load(index: &RepoIndex) -> Self {
        let manifests = Self {
            requirements_txt: read(index, "requirements.txt", |text| {
                Ok(parse_requirements(text))
            }),
            pipfile: read(index, "Pipfile", parse_pipfile),
            package_json: read(index, "package.json", parse_package_json),
            gemfile: read(index, "Gemfile", |text| Ok(parse_gemfile(text))),
            composer_json: read(index, "composer.json", parse_composer_json),
        };
        manifests.report_malformed();
        manifests
    }

    fn report_malformed(&self) {
        let outcomes = [
            ("requirements.txt", malformed_reason(&self.requirements_txt)),
            ("Pipfile", malformed_reason(&self.pipfile)),
            ("package.json", malformed_reason(&self.package_json)),
            ("Gemfile", malformed_reason(&self.gemfile)),
            ("composer.json", malformed_reason(&self.composer_json)),
        ];
        for (name, reason) in outcomes {
            if let Some(reason) = reason {
                warn!(manifest = name, %reason, "ignoring malformed manifest");
            }
        }
    }

    /// Ecosystem name → declared package names
    ///
    /// A parsed `Pipfile` replaces `requirements.txt` for the python entry.
    pub fn dependencies(&self) -> BTreeMap<String, Vec<String>> {
        let mut deps = BTreeMap::new();
        if let Some(python) = self.pipfile.parsed().or(self.requirements_txt.parsed()) {
            deps.insert("python".to_string(), python.clone());
        }
        if let Some(pkg) = self.package_json.parsed() {
            deps.insert("node".to_string(), pkg.dependencies.clone());
            deps.insert("node_dev".to_string(), pkg.dev_dependencies.clone());
        }
        if let Some(gems) = self.gemfile.parsed() {
            deps.insert("ruby".to_string(), gems.clone());
        }
        if let Some(php) = self.composer_json.parsed() {
            deps.insert("php".to_string(), php.clone());
        }
        deps
    }

    /// At least one manifest file exists
    pub fn any_present(&self) -> bool {
        self.requirements_txt.is_present()
            || self.pipfile.is_present()
            || self.package_json.is_present()
            || self.gemfile.is_present()
            || self.composer_json.is_present()
    }

    /// `package.json` parsed and declares a `start` script
    pub fn has_start_script(&self) -> bool {
        self.package_json
            .parsed()
            .is_some_and(|pkg| pkg.scripts.iter().any(|s| s == "start"))
    }
}

fn malformed_reason<T>(outcome: &ManifestOutcome<T>) -> Option<&str> {
    match outcome {
        ManifestOutcome::Malformed(reason) => Some(reason),
        _ => None,
    }
}

fn read<T>(
    index: &RepoIndex,
    name: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> ManifestOutcome<T> {
    if !index.contains(name) {
        return ManifestOutcome::Missing;
    }
    let Some(text) = index.text(name) else {
        return ManifestOutcome::Malformed("unreadable".to_string());
    };
    match parse(text) {
        Ok(value) => ManifestOutcome::Parsed(value),
        Err(reason) => ManifestOutcome::Malformed(reason),
    }
}

/// Package names from a pip requirements file
///
/// Version specifiers, extras, markers, and comments are stripped; option
/// lines (`-r`, `-e`, `--index-url`) are skipped.
pub fn parse_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(|line| {
            let end = line
                .find(|c: char| "=<>!~;[ @".contains(c))
                .unwrap_or(line.len());
            let name = line[..end].trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

fn parse_pipfile(text: &str) -> Result<Vec<String>, String> {
    let table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;
    match table.get("packages") {
        None => Ok(Vec::new()),
        Some(toml::Value::Table(packages)) => Ok(packages.keys().cloned().collect()),
        Some(_) => Err("[packages] is not a table".to_string()),
    }
}

fn parse_package_json(text: &str) -> Result<PackageJson, String> {
    let raw: RawPackageJson = serde_json::from_str(text).map_err(|e| e.to_string())?;
    Ok(PackageJson {
        dependencies: raw.dependencies.keys().cloned().collect(),
        dev_dependencies: raw.dev_dependencies.keys().cloned().collect(),
        scripts: raw.scripts.keys().cloned().collect(),
    })
}

fn parse_gemfile(text: &str) -> Vec<String> {
    GEM_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn parse_composer_json(text: &str) -> Result<Vec<String>, String> {
    let raw: RawComposerJson = serde_json::from_str(text).map_err(|e| e.to_string())?;
    Ok(raw.require.keys().cloned().collect())
}
