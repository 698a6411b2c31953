use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

/// Why caller-supplied input was rejected. Messages are safe to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Input must be provided as text")]
    InvalidType,

    #[error("Input must be at least {min} characters long (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Input is not a valid http(s) URL")]
    InvalidUrl,
}

/// Terminal outcome of a failed analysis. The `String` payloads carry internal
/// detail for operators; callers only ever see [`AppError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rate limited by model provider: {0}")]
    RateLimited(String),

    #[error("Model provider error: {0}")]
    Upstream(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model response violates contract: {0}")]
    ContractViolation(String),

    #[error("Failed to fetch page: {0}")]
    FetchFailed(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "configuration_error",
            AppError::Validation(_) => "validation_error",
            AppError::RateLimited(_) => "rate_limited",
            AppError::Upstream(_) => "upstream_error",
            AppError::MalformedResponse(_) => "malformed_response",
            AppError::ContractViolation(_) => "contract_violation",
            AppError::FetchFailed(_) => "fetch_failed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::ContractViolation(_) => StatusCode::BAD_GATEWAY,
            AppError::FetchFailed(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short, actionable message for the caller. Never includes internal detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Configuration(_) => {
                "The analysis service is not configured correctly. Please contact the operator.".to_string()
            }
            AppError::Validation(err) => err.to_string(),
            AppError::RateLimited(_) => {
                "The analysis service is busy right now. Please wait a moment and try again.".to_string()
            }
            AppError::Upstream(_) => {
                "The analysis service failed to respond. Please try again.".to_string()
            }
            AppError::MalformedResponse(_) | AppError::ContractViolation(_) => {
                "The analysis could not be completed. Please try again.".to_string()
            }
            AppError::FetchFailed(_) => {
                "Could not fetch readable content from the provided URL.".to_string()
            }
        }
    }

    /// Worth another attempt at the model call. Everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::RateLimited(_) | AppError::Upstream(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error::<()>(self.status_code(), self.code(), self.user_message()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
