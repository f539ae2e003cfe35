//! Fixed-dimension text encoders.
//!
//! [`TokenEncoder`] is a crude stand-in for a semantic embedding model: the
//! token ids of a text are used directly as vector components. Anything that
//! maps text to a vector of a fixed length can implement [`TextEncoder`] and
//! take its place.

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::tokenizer::{BpeTokenizer, Tokenizer};

/// Maps text to a vector of exactly [`TextEncoder::dimension`] values.
pub trait TextEncoder {
    /// Length of every vector this encoder produces.
    fn dimension(&self) -> usize;

    /// Encode `text`. Never substitutes a default vector on failure.
    fn encode(&self, text: &str) -> Result<Embedding>;
}

/// Right-pad `values` with zeros, or truncate them, to exactly `dimension`.
///
/// Truncation drops everything past the first `dimension` values.
pub fn fit_to_dimension(mut values: Embedding, dimension: usize) -> Embedding {
    values.resize(dimension, 0.0);
    values
}

/// Encodes text as its token ids cast to floats, padded or truncated.
#[derive(Debug)]
pub struct TokenEncoder<T = BpeTokenizer> {
    tokenizer: T,
    dimension: usize,
}

impl TokenEncoder<BpeTokenizer> {
    /// Encoder over the BPE tables of a named model profile.
    pub fn for_model(profile: &str, dimension: usize) -> Result<Self> {
        Self::new(BpeTokenizer::for_model(profile)?, dimension)
    }
}

impl<T: Tokenizer> TokenEncoder<T> {
    /// Create an encoder. `dimension` must be positive.
    pub fn new(tokenizer: T, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(dimension));
        }
        Ok(Self {
            tokenizer,
            dimension,
        })
    }

    /// The tokenizer behind this encoder.
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }
}

impl<T: Tokenizer> TextEncoder for TokenEncoder<T> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Embedding> {
        let values: Embedding = self
            .tokenizer
            .tokenize(text)?
            .into_iter()
            .take(self.dimension)
            .map(|token| token as f32)
            .collect();

        Ok(fit_to_dimension(values, self.dimension))
    }
}
