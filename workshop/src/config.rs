//! Configuration for workshop sessions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use writingway_embeddings::{DEFAULT_DIMENSION, DEFAULT_MODEL_PROFILE, DistanceMetric};

use crate::error::{Result, WorkshopError};

/// Prefix of the prompt that asks the model to summarise a conversation.
pub const DEFAULT_SUMMARY_PREFIX: &str = "Summarize the following conversation:";

/// Configuration for a workshop session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopConfig {
    /// Embedding index configuration.
    pub embedding: EmbeddingConfig,

    /// Context retrieval configuration.
    pub retrieval: RetrievalConfig,

    /// Conversation history configuration.
    pub history: HistoryConfig,

    /// System prompt opening every new conversation.
    pub system_prompt: Option<String>,
}

impl WorkshopConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded workshop configuration from {}", path.display());
        Ok(config)
    }

    /// Check values that would otherwise fail later.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimension == 0 {
            return Err(WorkshopError::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }
        if self.embedding.model_profile.trim().is_empty() {
            return Err(WorkshopError::Config(
                "embedding.model_profile must not be empty".to_string(),
            ));
        }
        if self.embedding.source == EmbeddingSource::OpenAi
            && self.embedding.remote.model.trim().is_empty()
        {
            return Err(WorkshopError::Config(
                "embedding.remote.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the number of chunks retrieved per turn.
    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval.k = k;
        self
    }

    /// Set the conversation token limit.
    pub fn with_token_limit(mut self, limit: usize) -> Self {
        self.history.token_limit = limit;
        self
    }
}

/// Configuration for the embedding index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Length of every encoded vector.
    pub dimension: usize,

    /// Tokenizer model profile.
    pub model_profile: String,

    /// Distance metric for nearest-neighbour search.
    pub metric: DistanceMetric,

    /// Where vectors come from.
    pub source: EmbeddingSource,

    /// Embedding API used when `source` is `openai`.
    pub remote: RemoteEmbeddingConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            model_profile: DEFAULT_MODEL_PROFILE.to_string(),
            metric: DistanceMetric::default(),
            source: EmbeddingSource::default(),
            remote: RemoteEmbeddingConfig::default(),
        }
    }
}

/// Source of the vectors stored in the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSource {
    /// Token ids of the configured tokenizer profile.
    #[default]
    Tokens,

    /// An OpenAI-compatible embeddings API, fitted to `dimension`.
    #[serde(rename = "openai")]
    OpenAi,
}

/// Remote embedding API settings. The key is read from `OPENAI_API_KEY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteEmbeddingConfig {
    /// Embedding model name.
    pub model: String,

    /// API base URL.
    pub base_url: String,
}

impl Default for RemoteEmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Configuration for context retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of earlier chunks pulled into each turn.
    pub k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: 3 }
    }
}

/// Configuration for conversation history budgeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Token budget for the payload sent with a turn.
    pub token_limit: usize,

    /// Messages containing this marker are never pruned.
    pub protected_marker: String,

    /// Prefix of the summarisation prompt.
    pub summary_prefix: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            token_limit: 2000,
            protected_marker: "*".to_string(),
            summary_prefix: DEFAULT_SUMMARY_PREFIX.to_string(),
        }
    }
}
