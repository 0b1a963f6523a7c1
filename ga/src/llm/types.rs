//! Chat message types for the completion service
//!
//! A conversation thread is an ordered list of [`Message`]s; each message
//! carries one or more [`ContentItem`]s so a product photo can ride along
//! with its serialized record.

use serde_json::{Value, json};
use tracing::debug;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single piece of message content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    ImageRef { url: String },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text(text.into())
    }

    pub fn image(url: impl Into<String>) -> Self {
        ContentItem::ImageRef { url: url.into() }
    }

    fn to_wire(&self) -> Value {
        match self {
            ContentItem::Text(text) => json!({ "type": "text", "text": text }),
            ContentItem::ImageRef { url } => json!({ "type": "image_url", "image_url": { "url": url } }),
        }
    }
}

/// A message in the conversation thread
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentItem>,
}

impl Message {
    /// Create a system message with text content
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: vec![ContentItem::text(text)],
        }
    }

    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentItem::text(text)],
        }
    }

    /// Create an assistant message with text content
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentItem::text(text)],
        }
    }

    /// Create a user message with multiple content items
    pub fn user_items(items: Vec<ContentItem>) -> Self {
        debug!(item_count = %items.len(), "Message::user_items: called");
        Self {
            role: Role::User,
            content: items,
        }
    }

    /// Concatenated text of all text items
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text(text) => Some(text.as_str()),
                ContentItem::ImageRef { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First image URL attached to this message, if any
    pub fn image_url(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ContentItem::ImageRef { url } => Some(url.as_str()),
            ContentItem::Text(_) => None,
        })
    }

    /// Convert to the chat completions message format
    ///
    /// A message holding exactly one text item is sent with plain string
    /// content; anything else is sent as a content-part array.
    pub fn to_wire(&self) -> Value {
        match self.content.as_slice() {
            [ContentItem::Text(text)] => json!({ "role": self.role.as_str(), "content": text }),
            items => json!({
                "role": self.role.as_str(),
                "content": items.iter().map(ContentItem::to_wire).collect::<Vec<_>>(),
            }),
        }
    }
}

/// A completion request - the whole thread for one call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation thread, oldest first
    pub messages: Vec<Message>,

    /// Ask the service to constrain the reply to a JSON object
    pub json_response: bool,
}

/// Response from a completion call
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text of the first choice, if the service returned any
    pub content: Option<String>,

    /// Token usage statistics
    pub usage: TokenUsage,
}

/// Token usage reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}
