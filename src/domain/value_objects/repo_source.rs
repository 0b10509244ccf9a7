//! Repository source value object
//!
//! Classifies user input into a remote URL, a local directory, or a packed
//! archive. Anything else is an input error raised before any stage runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AutodeployError, AutodeployResult};

/// Archive formats staging can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    Tar,
}

impl ArchiveFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

/// Where the application source comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RepoSource {
    /// Remote version-control URL (http(s) or scp-style `git@host:path`)
    Remote { url: String },
    /// Local directory
    Directory { path: PathBuf },
    /// Packed archive on disk
    Archive { path: PathBuf, format: ArchiveFormat },
}

impl RepoSource {
    /// Classify and validate a repository source string
    pub fn parse(input: &str) -> AutodeployResult<Self> {
        let trimmed = input.trim();
        let invalid = || AutodeployError::InvalidSource {
            source_spec: input.to_string(),
        };

        if trimmed.starts_with("git@") {
            return match trimmed.split_once(':') {
                Some((host, path)) if host.len() > 4 && !path.is_empty() => Ok(RepoSource::Remote {
                    url: trimmed.to_string(),
                }),
                _ => Err(invalid()),
            };
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = url::Url::parse(trimmed).map_err(|_| invalid())?;
            if url.host_str().map_or(true, str::is_empty) {
                return Err(invalid());
            }
            return Ok(RepoSource::Remote {
                url: trimmed.to_string(),
            });
        }

        let path = PathBuf::from(trimmed);
        if path.is_dir() {
            return Ok(RepoSource::Directory { path });
        }
        if path.is_file() {
            if let Some(format) = ArchiveFormat::from_path(&path) {
                return Ok(RepoSource::Archive { path, format });
            }
        }
        Err(invalid())
    }

    /// Short label for logs
    pub fn describe(&self) -> String {
        match self {
            RepoSource::Remote { url } => format!("remote repository {}", url),
            RepoSource::Directory { path } => format!("local directory {}", path.display()),
            RepoSource::Archive { path, .. } => format!("archive {}", path.display()),
        }
    }
}
