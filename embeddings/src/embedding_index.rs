//! Text-level nearest-neighbour index.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::encoder::{TextEncoder, TokenEncoder};
use crate::error::{EmbeddingError, Result};
use crate::index::{FlatIndex, VectorIndex};
use crate::similarity::Neighbor;
use crate::{DEFAULT_MODEL_PROFILE, Embedding, EntryId};

/// A stored text matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    /// Insertion id of the entry.
    pub id: EntryId,

    /// The text that was added.
    pub text: String,

    /// Distance from the query; smaller is nearer.
    pub distance: f32,
}

/// Remembers texts and returns the ones nearest to a query.
///
/// Every text is encoded into a vector of the index dimension and appended
/// to the backend; the i-th vector always belongs to the i-th text. Entries
/// are never removed or deduplicated.
#[derive(Debug)]
pub struct EmbeddingIndex<E = TokenEncoder, I = FlatIndex> {
    encoder: E,
    backend: I,
    texts: Vec<String>,
}

impl EmbeddingIndex {
    /// Create an index over the default tokenizer profile with a brute-force
    /// squared-euclidean backend.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_encoder(TokenEncoder::for_model(DEFAULT_MODEL_PROFILE, dimension)?)
    }
}

impl<E: TextEncoder> EmbeddingIndex<E, FlatIndex> {
    /// Create an index with a custom encoder and a brute-force backend.
    pub fn with_encoder(encoder: E) -> Result<Self> {
        let backend = FlatIndex::new(encoder.dimension())?;
        Self::with_backend(encoder, backend)
    }
}

impl<E, I: VectorIndex> EmbeddingIndex<E, I> {
    /// Pair an encoder producing `dimension`-length vectors with a backend.
    pub(crate) fn from_parts(encoder: E, dimension: usize, backend: I) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(0));
        }
        if dimension != backend.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: backend.dimension(),
                actual: dimension,
            });
        }
        if !backend.is_empty() {
            return Err(EmbeddingError::BackendNotEmpty(backend.len()));
        }

        info!(
            "Created embedding index (dimension {}, metric {:?})",
            backend.dimension(),
            backend.metric()
        );
        Ok(Self {
            encoder,
            backend,
            texts: Vec::new(),
        })
    }

    /// Append a text together with a vector computed elsewhere.
    pub fn add_embedding(&mut self, text: impl Into<String>, vector: Embedding) -> Result<EntryId> {
        let id = self.backend.add(vector)?;
        self.texts.push(text.into());
        debug!("Added entry {id} to embedding index");
        Ok(id)
    }

    /// Return up to `k` stored texts nearest to a precomputed vector.
    pub fn query_embedding(&self, vector: &[f32], k: usize) -> Result<Vec<String>> {
        Ok(self
            .query_embedding_matches(vector, k)?
            .into_iter()
            .map(|m| m.text)
            .collect())
    }

    /// Like [`EmbeddingIndex::query_embedding`], but with ids and distances.
    pub fn query_embedding_matches(&self, vector: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        let hits = self.backend.search(vector, k)?;
        let matches: Vec<QueryMatch> = hits
            .into_iter()
            .filter_map(|Neighbor { id, distance }| match self.texts.get(id) {
                Some(text) => Some(QueryMatch {
                    id,
                    text: text.clone(),
                    distance,
                }),
                None => {
                    warn!("Skipping search hit {id} with no stored text");
                    None
                }
            })
            .collect();

        debug!("Query matched {} of {} entries", matches.len(), self.len());
        Ok(matches)
    }

    /// Get a stored text by id.
    pub fn get(&self, id: EntryId) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    /// All stored texts in insertion order.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Dimension of every stored vector.
    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    /// The encoder that turns text into vectors for this index.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E: TextEncoder, I: VectorIndex> EmbeddingIndex<E, I> {
    /// Create an index from an encoder and a vector backend.
    ///
    /// The backend must be empty and share the encoder's dimension.
    pub fn with_backend(encoder: E, backend: I) -> Result<Self> {
        let dimension = encoder.dimension();
        Self::from_parts(encoder, dimension, backend)
    }

    /// Encode `text` and append it as a new entry.
    ///
    /// If encoding fails the index is left unchanged.
    pub fn add_text(&mut self, text: impl Into<String>) -> Result<EntryId> {
        let text = text.into();
        let vector = self.encoder.encode(&text)?;
        self.add_embedding(text, vector)
    }

    /// Return up to `k` stored texts nearest to `text`, nearest first.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .query_matches(text, k)?
            .into_iter()
            .map(|m| m.text)
            .collect())
    }

    /// Like [`EmbeddingIndex::query`], but with ids and distances.
    pub fn query_matches(&self, text: &str, k: usize) -> Result<Vec<QueryMatch>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.encoder.encode(text)?;
        self.query_embedding_matches(&vector, k)
    }
}
