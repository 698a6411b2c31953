//! The analyze operation: validate, build the prompt, call the model once
//! (or a bounded number of times when retries are enabled), parse the reply.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisResult;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::llm::{CompletionRequest, ModelClient, ModelError, OpenRouterClient};
use crate::parser::parse_analysis;
use crate::prompt::build_prompt;
use crate::scraper::fetch_page_text;
use crate::validation::{self, InputKind, ValidatedInput};

// Whole words only, so "generate" or "author" do not count.
static RATE_LIMIT_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\brate\b|\brate_limit|\bratelimit|too many requests")
        .expect("Failed to compile rate-limit pattern")
});

static AUTH_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(un)?auth(entication|enticated?|ori[sz]ation|ori[sz]ed)?\b|api[ _-]?key|credential")
        .expect("Failed to compile authentication pattern")
});

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub model: String,
    pub max_output_tokens: u32,
    /// Total model-call attempts; 1 means no retry.
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
}

impl From<&Config> for AnalyzerOptions {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            max_attempts: config.llm_max_attempts,
            retry_base_delay: config.llm_retry_base_delay,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub input_kind: InputKind,
    /// Characters of product text that went into the prompt.
    pub input_chars: usize,
}

/// Stateless apart from its immutable client handle; safe to share across tasks.
pub struct Analyzer {
    client: Option<Arc<dyn ModelClient>>,
    options: AnalyzerOptions,
}

impl Analyzer {
    pub fn new(client: Option<Arc<dyn ModelClient>>, options: AnalyzerOptions) -> Self {
        Self { client, options }
    }

    pub fn from_config(config: &Config) -> Self {
        let client = OpenRouterClient::from_config(config)
            .map(|client| Arc::new(client) as Arc<dyn ModelClient>);
        Self::new(client, AnalyzerOptions::from(config))
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn analyze(&self, input: Option<&Value>, claimed_type: Option<&str>) -> Result<Analysis> {
        let client = self.client.as_ref().ok_or_else(|| {
            AppError::Configuration("no model credential configured (OPENROUTER_API_KEY)".to_string())
        })?;

        let validated = validation::validate(input, claimed_type)?;
        let input_kind = validated.kind();
        let text: Cow<'_, str> = match validated {
            ValidatedInput::Text(text) => Cow::Borrowed(text),
            ValidatedInput::Url(url) => {
                info!("Fetching product page: {}", url);
                let page = fetch_page_text(&url).await?;
                validation::check_length(&page)?;
                Cow::Owned(page)
            }
        };

        let prompt = build_prompt(&text);
        debug!("Built prompt with length: {} chars", prompt.len());

        let raw = self.invoke(&**client, prompt).await?;

        let result = parse_analysis(&raw).inspect_err(|err| {
            warn!(error = %err, raw_payload = %raw, "Rejected model reply");
        })?;

        Ok(Analysis {
            result,
            input_kind,
            input_chars: text.chars().count(),
        })
    }

    async fn invoke(&self, client: &dyn ModelClient, prompt: String) -> Result<String> {
        let request = CompletionRequest {
            model: self.options.model.clone(),
            prompt,
            max_tokens: self.options.max_output_tokens,
        };

        let max_attempts = self.options.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let started = Instant::now();
            let outcome = client.complete(&request).await;
            let err = match outcome {
                Ok(reply) => {
                    info!(attempt, elapsed = ?started.elapsed(), "Model call succeeded");
                    return Ok(reply);
                }
                Err(err) => err,
            };

            let retry_after = match &err {
                ModelError::RateLimited { retry_after } => *retry_after,
                _ => None,
            };
            let classified = classify_model_error(err);
            warn!(attempt, max_attempts, error = %classified, "Model call failed");

            if attempt >= max_attempts || !classified.is_transient() {
                return Err(classified);
            }

            let delay = retry_after.unwrap_or_else(|| backoff_delay(self.options.retry_base_delay, attempt));
            debug!(?delay, "Retrying model call");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << (attempt - 1).min(10))
}

/// Maps a model client failure onto the analyze error taxonomy.
pub fn classify_model_error(err: ModelError) -> AppError {
    match err {
        ModelError::RateLimited { .. } => AppError::RateLimited(err.to_string()),
        ModelError::Unauthorized(_) => AppError::Configuration(err.to_string()),
        ModelError::Api { status: 429, .. } => AppError::RateLimited(err.to_string()),
        ModelError::Api { status: 401 | 403, .. } => AppError::Configuration(err.to_string()),
        other => {
            let message = other.to_string();
            if RATE_LIMIT_INDICATOR.is_match(&message) {
                AppError::RateLimited(message)
            } else if AUTH_INDICATOR.is_match(&message) {
                AppError::Configuration(message)
            } else {
                AppError::Upstream(message)
            }
        }
    }
}
