//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Index or encoder created with a zero dimension.
    #[error("invalid dimension {0}: must be positive")]
    InvalidDimension(usize),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Backend handed to an index already holds vectors.
    #[error("vector backend is not empty: holds {0} vectors without texts")]
    BackendNotEmpty(usize),

    /// Tokenizer profile could not be resolved.
    #[error("unknown tokenizer model profile `{profile}`: {message}")]
    UnknownModelProfile { profile: String, message: String },

    /// Tokenizer rejected the input.
    #[error("tokenizer `{profile}` failed: {message}")]
    Tokenizer { profile: String, message: String },

    /// Provider not configured.
    #[error("embedding provider not configured")]
    ProviderNotConfigured,

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
