//! Repository staging
//!
//! Materializes a [`RepoSource`] into a run-owned directory. Remote
//! sources are cloned, directories copied (without `.git`), archives
//! unpacked. Archives whose content sits under one top-level directory
//! are staged from that directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use ignore::WalkBuilder;
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{CommandError, CommandRunner, CommandSpec};
use crate::domain::value_objects::{ArchiveFormat, RepoSource};

/// Archive metadata directories that never count as content
const ARCHIVE_NOISE: [&str; 1] = ["__MACOSX"];

/// Files the localhost rewrite may touch
const REWRITE_EXTENSIONS: [&str; 9] = ["js", "jsx", "ts", "tsx", "py", "html", "json", "vue", "env"];
const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:", "http://127.0.0.1:"];

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("git clone failed: {0}")]
    Clone(String),

    #[error("failed to unpack archive {path}: {message}")]
    Unpack { path: PathBuf, message: String },

    #[error("failed to copy repository: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// `git clone --depth 1 <url> <dest>`
pub fn clone_command(url: &str, dest: &Path) -> CommandSpec {
    CommandSpec::new("git")
        .args(["clone", "--depth", "1", url])
        .arg(dest.to_string_lossy())
}

/// Run one clone attempt
pub fn clone(runner: &dyn CommandRunner, url: &str, dest: &Path) -> Result<(), StagingError> {
    if dest.exists() {
        std::fs::remove_dir_all(dest)?;
    }
    let output = runner.run(&clone_command(url, dest))?;
    if output.success() {
        Ok(())
    } else {
        Err(StagingError::Clone(output.diagnostic().to_string()))
    }
}

/// Stage a source into `dest` (one clone attempt for remotes); returns
/// the repository root
pub fn stage(
    runner: &dyn CommandRunner,
    source: &RepoSource,
    dest: &Path,
) -> Result<PathBuf, StagingError> {
    match source {
        RepoSource::Remote { url } => {
            clone(runner, url, dest)?;
            Ok(dest.to_path_buf())
        }
        RepoSource::Directory { path } => {
            let copied = copy_tree(path, dest)?;
            debug!(files = copied, "copied repository");
            Ok(dest.to_path_buf())
        }
        RepoSource::Archive { path, format } => {
            unpack(runner, path, *format, dest)?;
            Ok(single_root(dest)?.unwrap_or_else(|| dest.to_path_buf()))
        }
    }
}

/// Recursive copy of regular files, skipping `.git`
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<usize> {
    std::fs::create_dir_all(dest)?;
    let walker = WalkBuilder::new(src)
        .standard_filters(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut copied = 0;
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);
        match entry.file_type() {
            Some(ft) if ft.is_dir() => std::fs::create_dir_all(&target)?,
            Some(ft) if ft.is_file() => {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), &target)?;
                copied += 1;
            }
            _ => debug!(path = %entry.path().display(), "skipping non-regular entry"),
        }
    }
    Ok(copied)
}

/// Unpack an archive into `dest`
pub fn unpack(
    runner: &dyn CommandRunner,
    archive: &Path,
    format: ArchiveFormat,
    dest: &Path,
) -> Result<(), StagingError> {
    std::fs::create_dir_all(dest)?;
    let failed = |message: String| StagingError::Unpack {
        path: archive.to_path_buf(),
        message,
    };
    match format {
        ArchiveFormat::TarGz => {
            let file = File::open(archive)?;
            tar::Archive::new(GzDecoder::new(file))
                .unpack(dest)
                .map_err(|e| failed(e.to_string()))
        }
        ArchiveFormat::Tar => {
            let file = File::open(archive)?;
            tar::Archive::new(file)
                .unpack(dest)
                .map_err(|e| failed(e.to_string()))
        }
        ArchiveFormat::Zip => {
            let output = runner.run(
                &CommandSpec::new("unzip")
                    .args(["-q", "-o"])
                    .arg(archive.to_string_lossy())
                    .arg("-d")
                    .arg(dest.to_string_lossy()),
            )?;
            if output.success() {
                Ok(())
            } else {
                Err(failed(output.diagnostic().to_string()))
            }
        }
    }
}

/// The only top-level directory of `dir`, if it has exactly one entry
pub fn single_root(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if ARCHIVE_NOISE.iter().any(|n| entry.file_name() == *n) {
            continue;
        }
        entries.push(entry);
    }
    match entries.as_slice() {
        [only] if only.file_type()?.is_dir() => Ok(Some(only.path())),
        _ => Ok(None),
    }
}

/// Point `http://localhost:<port>` style URLs in source-like files at `host`
///
/// Only the scheme and host change; ports and paths are kept. Returns the
/// number of files rewritten. `.git` and `node_modules` are never touched.
pub fn rewrite_localhost_urls(root: &Path, host: &str) -> io::Result<usize> {
    let replacement = format!("http://{}:", host);
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|entry| entry.file_name() != ".git" && entry.file_name() != "node_modules")
        .build();

    let mut rewritten = 0;
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let eligible = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| REWRITE_EXTENSIONS.contains(&e))
            || path.file_name().is_some_and(|n| n == ".env");
        if !eligible {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(path) else {
            continue;
        };
        if !LOCAL_ORIGINS.iter().any(|origin| text.contains(origin)) {
            continue;
        }
        let updated = LOCAL_ORIGINS
            .iter()
            .fold(text, |acc, origin| acc.replace(origin, &replacement));
        std::fs::write(path, updated)?;
        rewritten += 1;
    }
    Ok(rewritten)
}
