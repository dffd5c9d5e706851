//! OpenAI-compatible summarization provider
//!
//! Sends the note to a chat completions endpoint with a style-specific
//! prompt. Works with any OpenAI-compatible API via a configurable base URL;
//! the API key is read from the environment variable named in config.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::{OpenAiConfig, credential_from_env};
use crate::summarizer::prompts::{self, SYSTEM_PROMPT};
use crate::summarizer::provider::SummaryProvider;
use crate::summarizer::types::{ProviderKind, ResolvedOptions, SummarizerError};

/// Summarizer backed by an OpenAI-compatible chat completions API
#[derive(Debug)]
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    config: OpenAiConfig,
    api_key: String,
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

/// Message in the chat completion request
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

/// Choice in the chat completion response
#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Message in the response choice
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider reading the API key from `config.api_key_env`
    ///
    /// Returns a configuration error if the variable is unset or empty.
    pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self, SummarizerError> {
        let api_key = credential_from_env(&config.api_key_env).ok_or_else(|| {
            SummarizerError::ConfigError(format!(
                "API key env var '{}' not set",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key, timeout)
    }

    /// Create a provider with an explicit API key
    pub fn with_api_key(
        config: &OpenAiConfig,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, SummarizerError> {
        let base = Url::parse(&config.api_url).map_err(|e| {
            SummarizerError::ConfigError(format!("Invalid OpenAI api_url '{}': {e}", config.api_url))
        })?;
        let endpoint = format!("{}/chat/completions", base.as_str().trim_end_matches('/'));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummarizerError::ConfigError(e.to_string()))?;

        info!(
            "OpenAiProvider initialized with model: {}, api_url: {}",
            config.model, config.api_url
        );

        Ok(Self {
            client,
            endpoint,
            config: config.clone(),
            api_key,
        })
    }

    fn build_request(&self, text: &str, options: &ResolvedOptions) -> ChatCompletionRequest {
        let max_words = (options.max_length * 3 / 4).max(10);
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompts::render(options.style, text, max_words),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: options.max_length.clamp(16, 4096) as u32,
        }
    }
}

/// Map a transport failure onto the summarizer taxonomy
pub(crate) fn map_transport_error(provider: &str, e: reqwest::Error) -> SummarizerError {
    if e.is_timeout() {
        SummarizerError::ProviderTimeout(format!("{provider}: {e}"))
    } else {
        SummarizerError::ProviderError(format!("{provider} request failed: {e}"))
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    async fn summarize(
        &self,
        text: &str,
        options: &ResolvedOptions,
    ) -> Result<String, SummarizerError> {
        let request = self.build_request(text, options);
        debug!("Calling OpenAI-compatible API at: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport_error(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SummarizerError::ProviderError(format!(
                "API returned {status}: {error_text}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            SummarizerError::ProviderError(format!("Failed to parse completion: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| clean_completion(&content))
            .filter(|content| !content.is_empty())
            .ok_or_else(|| SummarizerError::ProviderError("Empty response".to_string()))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

/// Trim a completion and drop one pair of quotes wrapping all of it
fn clean_completion(content: &str) -> String {
    let trimmed = content.trim();
    let unquoted = [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')]
        .iter()
        .find_map(|&(open, close)| {
            trimmed
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
