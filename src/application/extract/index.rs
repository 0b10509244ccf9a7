//! Repository index
//!
//! One filesystem walk per scan. Every later check queries this index; file
//! contents are read lazily, at most once, and cached.

use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, trace};

use crate::error::{AutodeployError, AutodeployResult};

/// Per-repository exclusion file, gitignore syntax
pub const IGNORE_FILE: &str = ".autodeployignore";

/// Files larger than this are never read for content
pub const MAX_TEXT_BYTES: u64 = 1024 * 1024;

/// Prefix inspected for NUL bytes to detect binary files
const BINARY_SNIFF_BYTES: usize = 8192;

/// Relative paths ('/'-separated) of every file under a repository root
#[derive(Debug)]
pub struct RepoIndex {
    root: PathBuf,
    sizes: BTreeMap<String, u64>,
    texts: HashMap<String, OnceCell<Option<String>>>,
}

impl RepoIndex {
    /// Walk `root` once and record every regular file
    ///
    /// `.git` is never descended into. Unreadable entries are skipped; only a
    /// missing root is an error.
    pub fn scan(root: &Path) -> AutodeployResult<Self> {
        if !root.is_dir() {
            return Err(AutodeployError::RepositoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .add_custom_ignore_filename(IGNORE_FILE)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut sizes = BTreeMap::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            sizes.insert(to_slash_path(relative), size);
        }

        Ok(Self::from_parts(root.to_path_buf(), sizes))
    }

    fn from_parts(root: PathBuf, sizes: BTreeMap<String, u64>) -> Self {
        let texts = sizes
            .keys()
            .map(|path| (path.clone(), OnceCell::new()))
            .collect();
        Self { root, sizes, texts }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// All relative paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.sizes.contains_key(relative)
    }

    /// Paths whose extension is in `extensions` (without the dot)
    pub fn with_extensions<'a>(
        &'a self,
        extensions: &'a [&'a str],
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.paths()
            .filter(move |path| extension(path).is_some_and(|ext| extensions.contains(&ext)))
    }

    /// Lossy text content of a file, or `None` if it is missing, too large,
    /// binary, or unreadable
    pub fn text(&self, relative: &str) -> Option<&str> {
        let cell = self.texts.get(relative)?;
        let size = self.sizes.get(relative).copied().unwrap_or(0);
        cell.get_or_init(|| load_text(&self.root.join(relative), size))
            .as_deref()
    }
}

fn load_text(path: &Path, size: u64) -> Option<String> {
    if size > MAX_TEXT_BYTES {
        trace!(path = %path.display(), "skipping large file");
        return None;
    }
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            trace!(path = %path.display(), error = %err, "skipping unreadable file");
            return None;
        }
    };
    if bytes.iter().take(BINARY_SNIFF_BYTES).any(|b| *b == 0) {
        return None;
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Final path segment
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of the final segment, without the dot
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scan_records_relative_paths_and_skips_git() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/api")).unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join("src/api/app.py"), "print('hi')").unwrap();
        fs::write(dir.path().join(".git/objects/blob"), "x").unwrap();
        fs::write(dir.path().join(".env.example"), "PORT=5000").unwrap();

        let index = RepoIndex::scan(dir.path()).unwrap();
        let paths: Vec<&str> = index.paths().collect();
        assert_eq!(paths, vec![".env.example", "src/api/app.py"]);
    }

    #[test]
    fn ignore_file_excludes_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/lib.js"), "x").unwrap();
        fs::write(dir.path().join("index.js"), "x").unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "vendor/\n").unwrap();

        let index = RepoIndex::scan(dir.path()).unwrap();
        assert!(index.contains("index.js"));
        assert!(!index.contains("vendor/lib.js"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let err = RepoIndex::scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AutodeployError::RepositoryNotFound { .. }));
    }

    #[test]
    fn binary_files_have_no_text() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("logo.py"), [0u8, 159, 146, 150]).unwrap();
        fs::write(dir.path().join("app.py"), "from flask import Flask").unwrap();

        let index = RepoIndex::scan(dir.path()).unwrap();
        assert_eq!(index.text("logo.py"), None);
        assert_eq!(index.text("app.py"), Some("from flask import Flask"));
        assert_eq!(index.text("missing.py"), None);
    }

    #[test]
    fn extension_helpers() {
        assert_eq!(extension("src/app.py"), Some("py"));
        assert_eq!(extension(".env"), None);
        assert_eq!(extension("Dockerfile"), None);
        assert_eq!(file_name("a/b/c.txt"), "c.txt");
    }
}
