//! Chat Completions transport for Azure OpenAI and OpenAI
//!
//! One HTTP call per `complete`. Both providers share the request and
//! response shapes; they differ only in URL layout and auth header.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, TokenUsage};
use crate::config::LlmConfig;

/// Which flavour of the chat completions API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// `{base}/openai/deployments/{deployment}/chat/completions`, `api-key` header
    Azure,
    /// `{base}/v1/chat/completions`, bearer token
    OpenAI,
}

impl Provider {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "azure" => Some(Provider::Azure),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }
}

/// Chat completions client
pub struct OpenAIClient {
    provider: Provider,
    model: String,
    api_key: String,
    base_url: String,
    api_version: String,
    http: Client,
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn from_config(provider: Provider, config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(?provider, model = %config.model, "from_config: called");
        let api_key = config.get_api_key().map_err(|e| LlmError::Config(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            provider,
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        match self.provider {
            Provider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, self.model, self.api_version
            ),
            Provider::OpenAI => format!("{}/v1/chat/completions", self.base_url),
        }
    }

    /// Build the request body for the chat completions API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(message_count = %request.messages.len(), json = request.json_response, "build_request_body: called");
        let messages: Vec<_> = request.messages.iter().map(|m| m.to_wire()).collect();

        let mut body = serde_json::json!({ "messages": messages });

        // Azure routes on the deployment in the URL
        if self.provider == Provider::OpenAI {
            body["model"] = serde_json::json!(self.model);
        }

        if request.json_response {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    fn parse_response(&self, api_response: ChatResponse) -> CompletionResponse {
        debug!(choice_count = api_response.choices.len(), "parse_response: called");
        let content = api_response.choices.into_iter().next().and_then(|c| c.message.content);
        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        CompletionResponse { content, usage }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(provider = ?self.provider, model = %self.model, "complete: called");
        let body = self.build_request_body(&request);

        let builder = self.http.post(self.endpoint()).json(&body);
        let builder = match self.provider {
            Provider::Azure => builder.header("api-key", &self.api_key),
            Provider::OpenAI => builder.bearer_auth(&self.api_key),
        };

        let response = builder.send().await.map_err(LlmError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "complete: API error");
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ChatResponse = response.json().await.map_err(LlmError::Network)?;
        debug!("complete: success");
        Ok(self.parse_response(api_response))
    }
}

// Chat completions response types

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ContentItem, Message};

    fn client(provider: Provider) -> OpenAIClient {
        OpenAIClient {
            provider,
            model: "gpt-4o".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://example.openai.azure.com".to_string(),
            api_version: "2024-02-01".to_string(),
            http: Client::new(),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                Message::system("You rate products"),
                Message::user_items(vec![
                    ContentItem::text("{}"),
                    ContentItem::image("https://example.com/p.jpg"),
                ]),
            ],
            json_response: true,
        }
    }

    #[test]
    fn test_build_request_body_azure() {
        let body = client(Provider::Azure).build_request_body(&request());

        assert!(body.get("model").is_none());
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You rate products");
        assert_eq!(body["messages"][1]["content"][1]["type"], "image_url");
    }

    #[test]
    fn test_build_request_body_openai() {
        let mut req = request();
        req.json_response = false;
        let body = client(Provider::OpenAI).build_request_body(&req);

        assert_eq!(body["model"], "gpt-4o");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            client(Provider::Azure).endpoint(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(
            client(Provider::OpenAI).endpoint(),
            "https://example.openai.azure.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_response_takes_first_choice() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{\"type\":\"query\",\"query\":\"bamboo\"}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let resp = client(Provider::Azure).parse_response(parsed);

        assert_eq!(resp.content.as_deref(), Some(r#"{"type":"query","query":"bamboo"}"#));
        assert_eq!(resp.usage.prompt_tokens, 12);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let resp = client(Provider::Azure).parse_response(parsed);
        assert!(resp.content.is_none());
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("azure"), Some(Provider::Azure));
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAI));
        assert_eq!(Provider::parse("anthropic"), None);
    }
}
