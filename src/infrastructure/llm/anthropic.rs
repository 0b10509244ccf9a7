//! Anthropic messages API

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{check_status, http_client, non_empty, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};
use crate::config::BackendConfig;
use crate::domain::ports::{BackendError, LanguageBackend};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl AnthropicBackend {
    pub fn new(api_key: &str, config: &BackendConfig) -> Result<Self, BackendError> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.to_string(),
            endpoint: format!("{}/v1/messages", base),
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text blocks of a reply
fn reply_text(reply: MessagesResponse) -> Option<String> {
    let text: String = reply
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    Some(text)
}

impl LanguageBackend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "system": SYSTEM_PROMPT,
            "messages": [{"role": "user", "content": prompt}],
        });
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let reply: MessagesResponse = check_status(response)?
            .json()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        non_empty(reply_text(reply))
    }
}
