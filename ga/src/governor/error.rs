//! Governor error types

use thiserror::Error;

use crate::llm::LlmError;

/// Why a governed submission failed
#[derive(Debug, Error)]
pub enum GovernorError {
    /// Non-retryable upstream or network failure; no further attempts were made
    #[error("Completion service failed: {0}")]
    Fatal(#[source] LlmError),

    #[error("Completion service still failing after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: LlmError,
    },

    #[error("Completion service returned no content")]
    EmptyResponse,

    #[error("Cancelled while waiting on the completion service")]
    Cancelled,
}
