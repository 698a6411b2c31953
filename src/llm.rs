//! Model invocation.
//!
//! The analyzer only depends on [`ModelClient`]; [`OpenRouterClient`] is the
//! production implementation speaking the OpenRouter chat-completions API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Failures reported by a model client.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Invalid response format from LLM: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Sends one prompt to a language model and returns its raw text reply.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

pub struct OpenRouterClient {
    http: Client,
    api_key: String,
    base_url: String,
    site_url: Option<String>,
    site_name: Option<String>,
}

impl fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            site_url: None,
            site_name: None,
        }
    }

    /// `None` when no credential is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.openrouter_api_key.as_deref()?;
        let mut client = Self::new(api_key, config.openrouter_base_url.clone());
        client.site_url = config.site_url.clone();
        client.site_name = config.site_name.clone();
        Some(client)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: vec![Message {
                role: "user".into(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens,
        };

        let mut builder = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body);

        // Add optional headers if provided
        if let Some(url) = &self.site_url {
            builder = builder.header("HTTP-Referer", url);
        }

        if let Some(name) = &self.site_name {
            builder = builder.header("X-Title", name);
        }

        let res = builder
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = res
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ModelError::RateLimited { retry_after });
        }

        let text = res
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| status.to_string());
            return Err(match status.as_u16() {
                401 | 403 => ModelError::Unauthorized(message),
                code => ModelError::Api { status: code, message },
            });
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        if let Some(err) = body_error(&json) {
            return Err(err);
        }

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::InvalidResponse("missing choices[0].message.content".to_string()))
    }
}

/// OpenRouter can report provider failures inside a 200 body.
fn body_error(json: &serde_json::Value) -> Option<ModelError> {
    let error = json.get("error")?;
    let message = error["message"]
        .as_str()
        .unwrap_or("unknown provider error")
        .to_string();
    // Codes outside the HTTP range carry no status meaning
    let code = error["code"]
        .as_u64()
        .and_then(|c| u16::try_from(c).ok())
        .unwrap_or(0);
    Some(match code {
        429 => ModelError::RateLimited { retry_after: None },
        401 | 403 => ModelError::Unauthorized(message),
        0 => ModelError::Other(message),
        status => ModelError::Api { status, message },
    })
}

fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["message"].as_str())
        .map(str::to_string)
}
