use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Absent when no credential is configured; the server still starts.
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
    pub llm_max_attempts: u32,
    pub llm_retry_base_delay: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openrouter_api_key = non_blank("OPENROUTER_API_KEY");
        let openrouter_base_url = non_blank("OPENROUTER_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !openrouter_base_url.starts_with("http://") && !openrouter_base_url.starts_with("https://") {
            return Err(AppError::Configuration(
                "OPENROUTER_BASE_URL must start with http:// or https://".to_string(),
            ));
        }

        // Load server configuration with defaults
        let host = non_blank("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_or(&non_blank, "PORT", 3000)?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Configuration(format!("Invalid host address: {}", e)))?;

        let llm_max_attempts: u32 = parse_or(&non_blank, "LLM_MAX_ATTEMPTS", 1)?;
        if llm_max_attempts == 0 {
            return Err(AppError::Configuration("LLM_MAX_ATTEMPTS must be at least 1".to_string()));
        }

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openrouter_api_key,
            openrouter_base_url,
            site_url: non_blank("OPENROUTER_SITE_URL"),
            site_name: non_blank("OPENROUTER_SITE_NAME"),
            model: non_blank("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_output_tokens: parse_or(&non_blank, "LLM_MAX_TOKENS", 2000)?,
            llm_max_attempts,
            llm_retry_base_delay: Duration::from_millis(parse_or(&non_blank, "LLM_RETRY_BASE_DELAY_MS", 500)?),
            request_timeout: Duration::from_secs(parse_or(&non_blank, "REQUEST_TIMEOUT_SECS", 90)?),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.openrouter_api_key.is_some()
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Configuration(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field(
                "openrouter_api_key",
                &self.openrouter_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("llm_max_attempts", &self.llm_max_attempts)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
