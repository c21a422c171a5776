// src/services/provider.rs
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("provider returned no choices")]
    EmptyCompletion,
}

/// One message of an outbound completion request. Role strings follow the
/// chat-completions wire format.
#[derive(Clone, Debug, Serialize)]
pub struct ProviderMessage {
    pub role: &'static str,
    pub content: String,
}

impl ProviderMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant", content: content.into() }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ProviderMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint. The request
/// timeout lives on the underlying HTTP client, so a stalled upstream can
/// never hold a request handler past the configured bound.
#[derive(Clone, Debug)]
pub struct ProviderClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl ProviderClient {
    /// Returns `Ok(None)` when no API key is configured: the provider is
    /// simply disabled, never a boot failure.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        let Some(api_key) = config.provider_api_key.clone() else {
            return Ok(None);
        };
        let client = Self::new(
            config.provider_api_base.clone(),
            api_key,
            config.provider_model.clone(),
            config.provider_timeout,
        )?;
        Ok(Some(client))
    }

    pub fn new(
        api_base: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one completion request and returns the generated text.
    pub async fn complete(
        &self,
        messages: &[ProviderMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let completion: CompletionResponse = response.json().await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyCompletion)?;

        Ok(text.trim().to_string())
    }
}
