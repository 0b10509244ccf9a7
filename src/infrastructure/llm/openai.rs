//! OpenAI-compatible chat completions

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{check_status, http_client, non_empty, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};
use crate::config::BackendConfig;
use crate::domain::ports::{BackendError, LanguageBackend};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, config: &BackendConfig) -> Result<Self, BackendError> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.to_string(),
            endpoint: format!("{}/chat/completions", base),
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl LanguageBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
        });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let reply: ChatResponse = check_status(response)?
            .json()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        non_empty(
            reply
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
        )
    }
}
