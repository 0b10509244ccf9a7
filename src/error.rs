//! Error types for AutoDeploy
//!
//! Uses `thiserror` for library errors. Only input errors and hard I/O
//! failures live here; orchestration stage failures have their own type
//! in `application::deploy`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for AutoDeploy operations
pub type AutodeployResult<T> = Result<T, AutodeployError>;

/// Main error type for AutoDeploy operations
#[derive(Error, Debug)]
pub enum AutodeployError {
    /// Repository source is not a URL, directory, or supported archive
    #[error("invalid repository source '{source_spec}': must be a git URL, a local directory, or a .zip/.tar.gz/.tgz/.tar archive")]
    InvalidSource { source_spec: String },

    /// Deployment description is too short to interpret
    #[error("deployment description too short ({length} characters, at least {minimum} required)")]
    DescriptionTooShort { length: usize, minimum: usize },

    /// Unknown cloud provider selection
    #[error("invalid cloud provider '{value}' (expected one of: aws, gcp, azure)")]
    InvalidProvider { value: String },

    /// Repository root to scan does not exist
    #[error("repository root not found: {path}")]
    RepositoryNotFound { path: PathBuf },

    /// Invalid configuration file
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
