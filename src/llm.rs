//! LLM client for report synthesis (OpenRouter and OpenAI-compatible providers)

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Environment variable consulted when no API key is configured.
const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Configuration for an LLM API provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL for the API (e.g., "https://openrouter.ai/api/v1")
    pub base_url: String,
    /// API key for authentication; always injected, never a baked constant
    pub api_key: String,
    /// Extra headers to include in requests (e.g., X-Title, HTTP-Referer)
    pub extra_headers: Vec<(String, String)>,
}

impl ProviderConfig {
    /// Create an OpenRouter provider configuration
    pub fn openrouter(api_key: String) -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key,
            extra_headers: vec![
                (
                    "HTTP-Referer".to_string(),
                    "https://github.com/dao-analyst".to_string(),
                ),
                ("X-Title".to_string(), "DAO Analyst".to_string()),
            ],
        }
    }

    /// Create a provider configuration for any OpenAI-compatible endpoint
    pub fn custom(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            extra_headers: Vec::new(),
        }
    }
}

/// Chat-completion client for the report-generation service
#[derive(Clone)]
pub struct LlmClient {
    client: Arc<Client>,
    provider: ProviderConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    /// Create a client with a specific provider configuration
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            client: Arc::new(Client::new()),
            provider,
        }
    }

    /// Create a client from config; the key comes from the config file or
    /// the `OPENROUTER_API_KEY` environment variable.
    pub fn from_config(config: &crate::config::LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .with_context(|| {
                format!("no API key configured; set [llm].api_key or {API_KEY_ENV}")
            })?;

        let provider = if config.base_url == OPENROUTER_BASE_URL {
            ProviderConfig::openrouter(api_key)
        } else {
            ProviderConfig::custom(config.base_url.clone(), api_key)
        };
        Ok(Self::new(provider))
    }

    /// Get the provider configuration
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Send a chat completion request and return the reply text
    pub async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            max_tokens,
            temperature: Some(0.7),
        };

        let mut req_builder = self
            .client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .header("Authorization", format!("Bearer {}", self.provider.api_key));
        for (key, value) in &self.provider.extra_headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }
        let response = req_builder
            .json(&request)
            .send()
            .await
            .context("Failed to send request to LLM provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("LLM API error ({}): {}", status, body);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response envelope")?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .context("LLM response contained no completion text")
    }
}
