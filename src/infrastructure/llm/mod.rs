//! Natural-language backends
//!
//! Both speak JSON over blocking HTTPS with a fixed low temperature and a
//! small token budget. Selection is driven by an explicit
//! [`BackendConfig`]; no backend is the rule-based path.

mod anthropic;
mod openai;

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::{info, warn};

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;

use crate::config::{BackendConfig, BackendKind};
use crate::domain::ports::{BackendError, LanguageBackend};

pub const TEMPERATURE: f64 = 0.1;
pub const MAX_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = "You are a cloud infrastructure expert. Reply with a single JSON object and nothing else.";

/// Build the configured backend, if any
pub fn from_config(config: &BackendConfig) -> Option<Box<dyn LanguageBackend>> {
    let openai = || {
        config
            .openai_api_key
            .as_deref()
            .map(|key| OpenAiBackend::new(key, config))
    };
    let anthropic = || {
        config
            .anthropic_api_key
            .as_deref()
            .map(|key| AnthropicBackend::new(key, config))
    };

    let built: Option<Result<Box<dyn LanguageBackend>, BackendError>> = match config.kind {
        BackendKind::None => None,
        BackendKind::Openai => openai().map(|b| b.map(boxed)),
        BackendKind::Anthropic => anthropic().map(|b| b.map(boxed)),
        BackendKind::Auto => openai()
            .map(|b| b.map(boxed))
            .or_else(|| anthropic().map(|b| b.map(boxed))),
    };

    match built {
        Some(Ok(backend)) => {
            info!(backend = backend.name(), "natural-language backend enabled");
            Some(backend)
        }
        Some(Err(err)) => {
            warn!("natural-language backend unavailable: {}", err);
            None
        }
        None => {
            if matches!(config.kind, BackendKind::Openai | BackendKind::Anthropic) {
                warn!(kind = ?config.kind, "backend selected but no API key set");
            }
            None
        }
    }
}

fn boxed<B: LanguageBackend + 'static>(backend: B) -> Box<dyn LanguageBackend> {
    Box::new(backend)
}

fn http_client(timeout_secs: u64) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| BackendError::Transport(e.to_string()))
}

/// Turn a non-2xx response into [`BackendError::Status`]
fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body: body.chars().take(300).collect(),
    })
}

fn non_empty(text: Option<String>) -> Result<String, BackendError> {
    text.filter(|t| !t.trim().is_empty())
        .ok_or(BackendError::EmptyReply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: BackendKind, openai: Option<&str>, anthropic: Option<&str>) -> BackendConfig {
        BackendConfig {
            kind,
            openai_api_key: openai.map(str::to_string),
            anthropic_api_key: anthropic.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn no_keys_means_rule_based() {
        assert!(from_config(&config(BackendKind::Auto, None, None)).is_none());
        assert!(from_config(&config(BackendKind::Openai, None, Some("k"))).is_none());
    }

    #[test]
    fn none_ignores_keys() {
        assert!(from_config(&config(BackendKind::None, Some("k"), Some("k"))).is_none());
    }

    #[test]
    fn auto_prefers_openai_then_anthropic() {
        let both = from_config(&config(BackendKind::Auto, Some("a"), Some("b"))).unwrap();
        assert_eq!(both.name(), "openai");
        let only = from_config(&config(BackendKind::Auto, None, Some("b"))).unwrap();
        assert_eq!(only.name(), "anthropic");
    }

    #[test]
    fn empty_text_is_an_empty_reply() {
        assert!(matches!(non_empty(Some("  ".into())), Err(BackendError::EmptyReply)));
        assert!(matches!(non_empty(None), Err(BackendError::EmptyReply)));
        assert_eq!(non_empty(Some("{}".into())).unwrap(), "{}");
    }
}
