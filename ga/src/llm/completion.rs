//! Typed completion call used by the request governor

use std::sync::Arc;

use tracing::debug;

use super::{CompletionRequest, LlmClient, LlmError, Message};

/// Sends a conversation thread and returns the reply text
///
/// Always asks for a JSON-object reply. Only the governor should hold one of
/// these; calling it directly bypasses pacing and retries.
pub struct CompletionClient {
    llm: Arc<dyn LlmClient>,
}

impl CompletionClient {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// One attempt; fails with [`LlmError::EmptyResponse`] when the reply has no text
    pub async fn call(&self, thread: &[Message]) -> Result<String, LlmError> {
        debug!(message_count = thread.len(), "CompletionClient::call: called");
        let request = CompletionRequest {
            messages: thread.to_vec(),
            json_response: true,
        };

        let response = self.llm.complete(request).await?;
        debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "CompletionClient::call: response received"
        );

        match response.content.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => {
                debug!("CompletionClient::call: no content in response");
                Err(LlmError::EmptyResponse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};

    #[tokio::test]
    async fn test_call_trims_text() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::text("  {\"type\":\"query\"}\n")]));
        let client = CompletionClient::new(mock.clone());

        let text = client.call(&[Message::user("hi")]).await.unwrap();
        assert_eq!(text, "{\"type\":\"query\"}");

        let calls = mock.calls();
        assert!(calls[0].json_response);
        assert_eq!(calls[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_call_rejects_empty_and_blank() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Empty, MockReply::text("   ")]));
        let client = CompletionClient::new(mock);

        assert!(matches!(client.call(&[]).await, Err(LlmError::EmptyResponse)));
        assert!(matches!(client.call(&[]).await, Err(LlmError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_call_passes_status_through() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Status(429)]));
        let client = CompletionClient::new(mock);

        let err = client.call(&[]).await.unwrap_err();
        assert!(err.is_rate_limit());
    }
}
