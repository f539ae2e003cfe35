//! One-off nearest-chunk searches over a text corpus.

use tracing::info;
use writingway_embeddings::{
    EmbeddingIndex, EmbeddingProvider, FlatIndex, OpenAIProvider, QueryMatch, RemoteEncoder,
    TokenEncoder,
};

use crate::config::{RemoteEmbeddingConfig, WorkshopConfig};
use crate::error::{Result, WorkshopError};

/// Split a corpus into chunks, one per non-empty line.
pub fn corpus_chunks(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Index `chunks` with the configured tokenizer and return the `k` nearest
/// to `query`.
pub fn search_corpus(
    config: &WorkshopConfig,
    chunks: Vec<String>,
    query: &str,
    k: usize,
) -> Result<Vec<QueryMatch>> {
    config.validate()?;
    let embedding = &config.embedding;
    let encoder = TokenEncoder::for_model(&embedding.model_profile, embedding.dimension)?;
    let backend = FlatIndex::with_metric(embedding.dimension, embedding.metric)?;
    let mut index = EmbeddingIndex::with_backend(encoder, backend)?;

    for chunk in chunks {
        index.add_text(chunk)?;
    }
    info!("Indexed {} chunks", index.len());

    index.query_matches(query, k).map_err(WorkshopError::from)
}

/// Provider for the configured embedding API.
pub fn remote_provider(config: &RemoteEmbeddingConfig) -> OpenAIProvider {
    OpenAIProvider::new()
        .with_base_url(config.base_url.as_str())
        .with_model(config.model.as_str())
}

/// Like [`search_corpus`], with vectors from `provider`.
///
/// Chunks are embedded in one batch request.
pub async fn search_corpus_remote<P: EmbeddingProvider>(
    config: &WorkshopConfig,
    provider: P,
    chunks: Vec<String>,
    query: &str,
    k: usize,
) -> Result<Vec<QueryMatch>> {
    config.validate()?;
    let embedding = &config.embedding;
    let encoder = RemoteEncoder::new(provider, embedding.dimension)?;
    let backend = FlatIndex::with_metric(embedding.dimension, embedding.metric)?;
    let mut index = EmbeddingIndex::with_remote_encoder(encoder, backend)?;

    index.add_texts_async(chunks).await?;
    info!("Indexed {} chunks remotely", index.len());

    index
        .query_matches_async(query, k)
        .await
        .map_err(WorkshopError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_corpus_chunks_skip_blank_lines() {
        let chunks = corpus_chunks("  first chunk \n\n   \nsecond chunk\n");
        assert_eq!(chunks, vec!["first chunk", "second chunk"]);
    }

    #[test]
    fn test_remote_provider_uses_config() {
        let provider = remote_provider(&RemoteEmbeddingConfig {
            model: "text-embedding-3-large".to_string(),
            base_url: "http://localhost:1/v1".to_string(),
        });
        assert_eq!(provider.default_model(), "text-embedding-3-large");
        assert_eq!(provider.default_dimension(), 3072);
    }
}
