//! LanguageBackend port - natural-language extraction backend
//!
//! A backend turns one instruction prompt into one textual reply. Parsing
//! and validating the reply is the interpreter's job, not the backend's.

use thiserror::Error;

/// Backend request failures
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend reply had no text content")]
    EmptyReply,
}

/// A single-shot text completion backend
pub trait LanguageBackend {
    /// Short identifier used in logs (e.g. "openai")
    fn name(&self) -> &str;

    fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}
