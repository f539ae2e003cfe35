//! Remote embedding providers.
//!
//! A trained embedding model can stand in for the token-id encoder. Its
//! vectors are fitted to the index dimension with the same pad/truncate rule
//! and stored through [`crate::EmbeddingIndex::add_embedding`]; the
//! `*_async` methods on an index built with
//! [`EmbeddingIndex::with_remote_encoder`] do both steps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding_index::{EmbeddingIndex, QueryMatch};
use crate::encoder::fit_to_dimension;
use crate::error::{EmbeddingError, Result};
use crate::index::VectorIndex;
use crate::{Embedding, EntryId};

/// Seconds to wait when a rate-limited response carries no `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Request for generating embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Text to embed.
    pub text: String,

    /// Model to use (provider-specific).
    pub model: Option<String>,

    /// Dimensions for the output (if supported by provider).
    pub dimensions: Option<usize>,
}

impl EmbeddingRequest {
    /// Create a new embedding request.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            dimensions: None,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the output dimensions.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Response from embedding generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The generated embedding.
    pub embedding: Embedding,

    /// Model used to generate the embedding.
    pub model: String,

    /// Token usage (if available).
    pub tokens_used: Option<u64>,
}

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;

    /// Get the default embedding dimension.
    fn default_dimension(&self) -> usize;

    /// Generate an embedding for the given text.
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, requests: Vec<EmbeddingRequest>) -> Result<Vec<EmbeddingResponse>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.embed(request).await?);
        }
        Ok(results)
    }

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI-compatible embedding provider.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Default model.
    default_model: String,
}

impl OpenAIProvider {
    /// Create a new provider, reading the key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            default_model: "text-embedding-3-small".to_string(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    async fn post_embeddings(&self, body: serde_json::Value) -> Result<OpenAIEmbeddingResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "{status}: {error_text}"
            )));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn default_dimension(&self) -> usize {
        match self.default_model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        let model = request.model.unwrap_or_else(|| self.default_model.clone());
        debug!("Generating embedding with model: {model}");

        let mut body = serde_json::json!({
            "input": request.text,
            "model": model
        });
        if let Some(dims) = request.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let result = self.post_embeddings(body).await?;
        let tokens_used = result.usage.as_ref().map(|u| u.total_tokens);
        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))?
            .embedding;

        info!("Generated embedding with {} dimensions", embedding.len());

        Ok(EmbeddingResponse {
            embedding,
            model: result.model,
            tokens_used,
        })
    }

    async fn embed_batch(&self, requests: Vec<EmbeddingRequest>) -> Result<Vec<EmbeddingResponse>> {
        let Some(first) = requests.first() else {
            return Ok(Vec::new());
        };

        let model = first
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        let texts: Vec<&str> = requests.iter().map(|r| r.text.as_str()).collect();

        debug!(
            "Generating batch embeddings for {} texts with model: {model}",
            texts.len()
        );

        let body = serde_json::json!({
            "input": texts,
            "model": model
        });

        let mut result = self.post_embeddings(body).await?;
        if result.data.len() != requests.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                requests.len(),
                result.data.len()
            )));
        }
        result.data.sort_by_key(|item| item.index);

        let responses: Vec<EmbeddingResponse> = result
            .data
            .into_iter()
            .map(|item| EmbeddingResponse {
                embedding: item.embedding,
                model: result.model.clone(),
                tokens_used: None,
            })
            .collect();

        info!("Generated {} batch embeddings", responses.len());
        Ok(responses)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: u64,
}

/// Produces fixed-dimension vectors from an [`EmbeddingProvider`].
#[derive(Debug)]
pub struct RemoteEncoder<P> {
    provider: P,
    dimension: usize,
}

impl<P: EmbeddingProvider> RemoteEncoder<P> {
    /// Wrap a provider. `dimension` must be positive.
    pub fn new(provider: P, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(dimension));
        }
        Ok(Self {
            provider,
            dimension,
        })
    }

    /// Length of every vector this encoder produces.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed `text` and pad or truncate the result to the dimension.
    pub async fn encode(&self, text: &str) -> Result<Embedding> {
        let response = self.provider.embed(EmbeddingRequest::new(text)).await?;
        debug!(
            "Fitting {} embedding of length {} to {}",
            self.provider.name(),
            response.embedding.len(),
            self.dimension
        );
        Ok(fit_to_dimension(response.embedding, self.dimension))
    }

    /// Embed several texts in one request, preserving their order.
    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let requests = texts
            .iter()
            .map(|text| EmbeddingRequest::new(text.as_str()))
            .collect();
        let responses = self.provider.embed_batch(requests).await?;
        Ok(responses
            .into_iter()
            .map(|response| fit_to_dimension(response.embedding, self.dimension))
            .collect())
    }
}

impl<P: EmbeddingProvider, I: VectorIndex> EmbeddingIndex<RemoteEncoder<P>, I> {
    /// Create an index whose texts are embedded by a remote provider.
    pub fn with_remote_encoder(encoder: RemoteEncoder<P>, backend: I) -> Result<Self> {
        let dimension = encoder.dimension();
        Self::from_parts(encoder, dimension, backend)
    }

    /// Embed `text` remotely and append it as a new entry.
    pub async fn add_text_async(&mut self, text: impl Into<String>) -> Result<EntryId> {
        let text = text.into();
        let vector = self.encoder().encode(&text).await?;
        self.add_embedding(text, vector)
    }

    /// Embed `texts` in one batch and append them in order.
    ///
    /// Nothing is added if the provider call fails.
    pub async fn add_texts_async(&mut self, texts: Vec<String>) -> Result<Vec<EntryId>> {
        let vectors = self.encoder().encode_batch(&texts).await?;
        texts
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| self.add_embedding(text, vector))
            .collect()
    }

    /// Return up to `k` entries nearest to `text`, embedded remotely.
    pub async fn query_matches_async(&self, text: &str, k: usize) -> Result<Vec<QueryMatch>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.encoder().encode(text).await?;
        self.query_embedding_matches(&vector, k)
    }
}
