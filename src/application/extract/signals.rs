//! Individual profile signals derived from a [`RepoIndex`]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::value_objects::{DatabaseKind, Framework, Language, REDIS_KEYWORDS};

use super::index::{extension, file_name, RepoIndex};

/// Extensions whose contents are scanned for framework and env patterns
pub const SOURCE_EXTENSIONS: [&str; 5] = ["py", "js", "ts", "rb", "php"];

const CONFIG_EXTENSIONS: [&str; 7] = ["env", "yml", "yaml", "toml", "ini", "cfg", "conf"];
const CONFIG_STEMS: [&str; 2] = ["config", "settings"];
const ENV_FILES: [&str; 3] = [".env.example", ".env.sample", "env.example"];
const STATIC_DIRS: [&str; 5] = ["static", "public", "assets", "dist", "build"];
const GENERIC_DB_KEYWORDS: [&str; 4] = ["database", "db_", "DATABASE_URL", "DB_HOST"];

/// Absolute fallback when no framework default applies
pub const DEFAULT_PORT: u16 = 8000;

static PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bPORT\b["']?\s*[=:]\s*["']?(\d{2,5})\b"#).expect("port pattern is valid")
});

static PY_ENV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"os\.(?:environ\.get|getenv)\(\s*['"]([^'"]+)['"]"#)
        .expect("python env pattern is valid")
});

static NODE_ENV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"process\.env\.([A-Z_][A-Z0-9_]*)").expect("node env pattern is valid")
});

/// Plurality language by file extension; ties go to the earlier table entry
pub fn detect_language(index: &RepoIndex) -> Language {
    let mut counts = [0usize; Language::EXTENSIONS.len()];
    for path in index.paths() {
        if let Some(ext) = extension(path) {
            if let Some(slot) = Language::EXTENSIONS.iter().position(|(e, _)| *e == ext) {
                counts[slot] += 1;
            }
        }
    }
    let mut best: Option<(usize, usize)> = None;
    for (slot, count) in counts.iter().copied().enumerate() {
        if count > 0 && best.map_or(true, |(_, top)| count > top) {
            best = Some((slot, count));
        }
    }
    best.map_or(Language::Unknown, |(slot, _)| Language::EXTENSIONS[slot].1)
}

/// Configuration or environment file worth scanning for settings
pub fn is_config_like(path: &str) -> bool {
    let name = file_name(path);
    if name.starts_with(".env") || name.ends_with("env.example") {
        return true;
    }
    let Some(ext) = extension(path) else {
        return false;
    };
    if CONFIG_EXTENSIONS.contains(&ext) {
        return true;
    }
    let stem = &name[..name.len() - ext.len() - 1];
    CONFIG_STEMS.contains(&stem) && SOURCE_EXTENSIONS.contains(&ext)
}

fn config_files(index: &RepoIndex) -> impl Iterator<Item = &str> {
    index.paths().filter(|path| is_config_like(path))
}

fn matches_keyword(dependency: &str, keyword: &str) -> bool {
    // two-letter keywords ("pg") only count as the whole package name
    if keyword.len() <= 2 {
        dependency == keyword
    } else {
        dependency.contains(keyword)
    }
}

fn lowered_dependencies(deps: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    deps.values().flatten().map(|d| d.to_lowercase()).collect()
}

/// Database kind from dependency names, falling back to generic keywords in
/// config files (which default to the first kind)
pub fn detect_database(
    index: &RepoIndex,
    deps: &BTreeMap<String, Vec<String>>,
) -> Option<DatabaseKind> {
    let names = lowered_dependencies(deps);
    let from_deps = DatabaseKind::ALL.into_iter().find(|kind| {
        kind.keywords()
            .iter()
            .any(|kw| names.iter().any(|dep| matches_keyword(dep, kw)))
    });
    if from_deps.is_some() {
        return from_deps;
    }

    let mentions_database = config_files(index)
        .filter_map(|path| index.text(path))
        .any(|text| GENERIC_DB_KEYWORDS.iter().any(|kw| text.contains(kw)));
    mentions_database.then_some(DatabaseKind::ALL[0])
}

pub fn detect_redis(deps: &BTreeMap<String, Vec<String>>) -> bool {
    let names = lowered_dependencies(deps);
    REDIS_KEYWORDS
        .iter()
        .any(|kw| names.iter().any(|dep| matches_keyword(dep, kw)))
}

/// First `PORT=<n>` in a config file, else the framework default
pub fn detect_port(index: &RepoIndex, framework: Option<Framework>) -> u16 {
    config_files(index)
        .filter_map(|path| index.text(path))
        .find_map(|text| {
            PORT_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u16>().ok())
                .filter(|port| *port > 0)
        })
        .unwrap_or_else(|| framework.map_or(DEFAULT_PORT, |fw| fw.default_port()))
}

/// Sorted, de-duplicated environment variable names
pub fn environment_variables(index: &RepoIndex) -> Vec<String> {
    let mut vars = BTreeSet::new();

    for name in ENV_FILES {
        let Some(text) = index.text(name) else {
            continue;
        };
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            if let Some((key, _)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    vars.insert(key.to_string());
                }
            }
        }
    }

    for path in index.with_extensions(&["py", "js", "ts"]) {
        let Some(text) = index.text(path) else {
            continue;
        };
        for re in [&*PY_ENV_RE, &*NODE_ENV_RE] {
            vars.extend(
                re.captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string()),
            );
        }
    }

    vars.into_iter().collect()
}

/// Any directory component contains a static-asset directory name
pub fn has_static_assets(index: &RepoIndex) -> bool {
    index.paths().any(|path| {
        let mut components: Vec<&str> = path.split('/').collect();
        components.pop();
        components
            .iter()
            .any(|dir| STATIC_DIRS.iter().any(|name| dir.contains(name)))
    })
}

fn entry_candidates(framework: Option<Framework>) -> &'static [&'static str] {
    match framework {
        Some(Framework::Flask) => &["app.py", "main.py", "wsgi.py", "application.py"],
        Some(Framework::Django) => &["manage.py"],
        Some(Framework::Fastapi) => &["main.py", "app.py"],
        Some(Framework::Express) => &["index.js", "server.js", "app.js", "main.js"],
        Some(Framework::Nextjs) | Some(Framework::React) => &["package.json"],
        Some(Framework::Rails) => &["config.ru"],
        Some(Framework::Laravel) => &["artisan"],
        _ => &["main.py", "app.py", "index.js"],
    }
}

pub fn entry_point(index: &RepoIndex, framework: Option<Framework>) -> Option<String> {
    entry_candidates(framework)
        .iter()
        .find(|candidate| index.contains(candidate))
        .map(|candidate| candidate.to_string())
}

pub fn build_command(framework: Option<Framework>) -> Option<String> {
    match framework? {
        Framework::Nextjs | Framework::React | Framework::Vue => Some("npm run build".to_string()),
        Framework::Angular => Some("ng build".to_string()),
        _ => None,
    }
}

pub fn start_command(
    framework: Option<Framework>,
    entry_point: Option<&str>,
    port: u16,
    has_start_script: bool,
) -> Option<String> {
    match framework? {
        Framework::Flask => entry_point.map(|entry| format!("python {}", entry)),
        Framework::Django => Some(format!("python manage.py runserver 0.0.0.0:{}", port)),
        Framework::Fastapi => entry_point.map(|entry| {
            let module = entry.strip_suffix(".py").unwrap_or(entry);
            format!("uvicorn {}:app --host 0.0.0.0 --port {}", module, port)
        }),
        Framework::Express | Framework::Nextjs | Framework::React => {
            if has_start_script {
                return Some("npm start".to_string());
            }
            match entry_point {
                Some(entry) if entry.ends_with(".js") => Some(format!("node {}", entry)),
                _ => Some("npm start".to_string()),
            }
        }
        Framework::Rails => Some("rails server -b 0.0.0.0".to_string()),
        Framework::Laravel => Some("php artisan serve --host=0.0.0.0".to_string()),
        Framework::Vue | Framework::Angular | Framework::Spring => None,
    }
}
