//! Completion transport error types

use thiserror::Error;

/// Errors from a single completion attempt
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Completion service returned no content")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// 429 and every 5xx are worth another attempt
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

impl LlmError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::ApiError { status, .. } => Some(*status),
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        self.status() == Some(429)
    }

    /// Check if this error is retryable
    ///
    /// Only upstream statuses count; a network error without a status is fatal.
    pub fn is_retryable(&self) -> bool {
        self.status().map(is_retryable_status).unwrap_or(false)
    }
}
