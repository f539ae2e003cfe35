//! # Embeddings
//!
//! Nearest-neighbour text retrieval for the Writingway workshop chat.
//!
//! ## Features
//!
//! - **Encoding**: Turn text into fixed-dimension vectors
//! - **Similarity Search**: Brute-force k-NN over an append-only store
//! - **Pluggable Backends**: Swap the encoder or the vector index
//! - **Remote Providers**: Use an embedding service in place of token ids
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Tokenizer ──► TextEncoder ──► EmbeddingIndex                   │
//! │                    ▲                │                           │
//! │                    │                ▼                           │
//! │  EmbeddingProvider ┘          VectorIndex (FlatIndex)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use writingway_embeddings::EmbeddingIndex;
//!
//! let mut index = EmbeddingIndex::new(128)?;
//! index.add_text("Another important scene with key details.")?;
//! let hits = index.query("key details", 3)?;
//! ```

pub mod embedding_index;
pub mod encoder;
pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;
pub mod tokenizer;

pub use embedding_index::{EmbeddingIndex, QueryMatch};
pub use encoder::{TextEncoder, TokenEncoder, fit_to_dimension};
pub use error::{EmbeddingError, Result};
pub use index::{FlatIndex, VectorIndex};
pub use provider::{
    EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider, RemoteEncoder,
};
pub use similarity::{DistanceMetric, Neighbor, cosine_similarity, squared_euclidean_distance};
pub use tokenizer::{BpeTokenizer, TokenId, Tokenizer};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Position of an entry in insertion order.
pub type EntryId = usize;

/// Default dimension of encoded vectors.
pub const DEFAULT_DIMENSION: usize = 128;

/// Tokenizer profile used when none is configured.
pub const DEFAULT_MODEL_PROFILE: &str = "gpt-3.5-turbo";
