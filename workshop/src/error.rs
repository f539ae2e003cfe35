//! Error types for the workshop.

use thiserror::Error;

/// Result type alias for workshop operations.
pub type Result<T> = std::result::Result<T, WorkshopError>;

/// Errors that can occur in the workshop.
#[derive(Error, Debug)]
pub enum WorkshopError {
    /// Embedding or tokenizer error.
    #[error("embedding error: {0}")]
    Embedding(#[from] writingway_embeddings::EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Saved conversations could not be read or written.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No conversation with this name exists.
    #[error("unknown conversation: {0}")]
    UnknownConversation(String),

    /// A conversation with this name already exists.
    #[error("conversation already exists: {0}")]
    ConversationExists(String),

    /// Conversation names must contain a non-whitespace character.
    #[error("conversation name is empty")]
    EmptyConversationName,

    /// Message was empty after trimming.
    #[error("message is empty")]
    EmptyMessage,

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
