//! Completion service client module
//!
//! Provides the single-attempt transport trait, the chat completions
//! implementation, and the typed call wrapper the governor drives.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod completion;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use completion::CompletionClient;
pub use error::{LlmError, is_retryable_status};
pub use openai::{OpenAIClient, Provider};
pub use types::{CompletionRequest, CompletionResponse, ContentItem, Message, Role, TokenUsage};

use crate::config::LlmConfig;

/// Create a completion transport based on the provider specified in config
///
/// Supports "azure" and "openai" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match Provider::parse(&config.provider) {
        Some(provider) => {
            debug!(?provider, "create_client: creating chat completions client");
            Ok(Arc::new(OpenAIClient::from_config(provider, config)?))
        }
        None => {
            debug!(provider = %config.provider, "create_client: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: azure, openai",
                config.provider
            )))
        }
    }
}
