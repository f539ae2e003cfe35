//! Conversation history and token budgeting.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use writingway_embeddings::Tokenizer;

use crate::error::{Result, WorkshopError};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Number of tokens `text` occupies for `tokenizer`.
pub fn estimate_tokens(tokenizer: &impl Tokenizer, text: &str) -> Result<usize> {
    tokenizer.count_tokens(text).map_err(WorkshopError::from)
}

/// Whether a message is marked as protected from pruning.
pub fn is_protected(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.contains(marker)
}

/// Ordered messages of one workshop conversation.
///
/// When a system prompt is present it is the first message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Remove and return the last message.
    pub fn pop(&mut self) -> Option<ChatMessage> {
        self.messages.pop()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Total tokens across all message contents.
    pub fn estimate_tokens(&self, tokenizer: &impl Tokenizer) -> Result<usize> {
        self.messages
            .iter()
            .map(|m| estimate_tokens(tokenizer, &m.content))
            .sum()
    }

    /// Drop messages until the history fits in `limit` tokens.
    ///
    /// Removal starts after the first message, which is always kept, and
    /// skips protected messages. Returns how many messages were removed; the
    /// history may still exceed the limit if only kept messages remain.
    pub fn prune_to_limit(
        &mut self,
        tokenizer: &impl Tokenizer,
        limit: usize,
        protected_marker: &str,
    ) -> Result<usize> {
        let mut counts = self
            .messages
            .iter()
            .map(|m| estimate_tokens(tokenizer, &m.content))
            .collect::<Result<Vec<_>>>()?;
        let mut total: usize = counts.iter().sum();
        let mut removed = 0;
        let mut position = 1;

        while total > limit && position < self.messages.len() {
            if is_protected(&self.messages[position].content, protected_marker) {
                position += 1;
                continue;
            }
            self.messages.remove(position);
            total -= counts.remove(position);
            removed += 1;
        }

        if total > limit {
            warn!("Conversation still uses {total} tokens after pruning (limit {limit})");
        }
        debug!("Pruned {removed} messages from conversation");
        Ok(removed)
    }

    /// Prompt asking a model to summarise this conversation.
    pub fn summarization_prompt(&self, prefix: &str) -> String {
        let lines: Vec<String> = self
            .messages
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect();
        format!("{prefix}\n{}", lines.join("\n"))
    }

    /// Replace everything after the first message with a summary.
    pub fn collapse_with_summary(&mut self, summary: impl Into<String>) {
        self.messages.truncate(1);
        self.messages.push(ChatMessage::system(summary));
    }
}
