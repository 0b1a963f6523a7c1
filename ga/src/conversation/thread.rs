//! Append-only message thread for one run

use crate::llm::Message;

/// Ordered messages sent to the completion service
///
/// Owned by a single run. Messages are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct ConversationThread {
    messages: Vec<Message>,
}

impl ConversationThread {
    /// Start a thread with the system instruction and the product turn
    pub fn seeded(system: impl Into<String>, product: Message) -> Self {
        Self {
            messages: vec![Message::system(system), product],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
