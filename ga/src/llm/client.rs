//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Single-attempt transport to a chat completion service
///
/// Implementations make exactly one HTTP call per `complete` and never retry;
/// pacing and retries belong to the request governor.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a completion request and wait for the whole response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
