//! Tokenizers that turn text into integer token ids.

use tiktoken_rs::CoreBPE;
use tracing::info;

use crate::error::{EmbeddingError, Result};

/// A single token identifier.
pub type TokenId = u32;

/// Control tokens that the BPE tables reserve. Plain text must not smuggle
/// them in.
const RESERVED_SPECIAL_TOKENS: &[&str] = &[
    "<|endoftext|>",
    "<|fim_prefix|>",
    "<|fim_middle|>",
    "<|fim_suffix|>",
    "<|endofprompt|>",
];

/// Splits text into token ids.
///
/// Implementations must be deterministic for identical `(text, profile)`
/// pairs, otherwise distances between encoded vectors are not reproducible.
pub trait Tokenizer {
    /// Name of the model profile the token ids are keyed to.
    fn profile(&self) -> &str;

    /// Tokenize `text` into an ordered sequence of ids.
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>>;

    /// Number of tokens `text` occupies.
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.tokenize(text)?.len())
    }
}

/// Byte-pair-encoding tokenizer backed by the tiktoken tables.
pub struct BpeTokenizer {
    profile: String,
    bpe: CoreBPE,
}

impl BpeTokenizer {
    /// Resolve the BPE tables for a named model profile, e.g. `gpt-3.5-turbo`.
    pub fn for_model(profile: impl Into<String>) -> Result<Self> {
        let profile = profile.into();
        let bpe = tiktoken_rs::get_bpe_from_model(&profile).map_err(|err| {
            EmbeddingError::UnknownModelProfile {
                profile: profile.clone(),
                message: err.to_string(),
            }
        })?;

        info!("Loaded BPE tokenizer for profile {profile}");
        Ok(Self { profile, bpe })
    }
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl Tokenizer for BpeTokenizer {
    fn profile(&self) -> &str {
        &self.profile
    }

    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>> {
        if let Some(special) = RESERVED_SPECIAL_TOKENS
            .iter()
            .find(|special| text.contains(**special))
        {
            return Err(EmbeddingError::Tokenizer {
                profile: self.profile.clone(),
                message: format!("text contains reserved special token {special}"),
            });
        }

        Ok(self
            .bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|token| token as TokenId)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_is_deterministic() {
        let tokenizer = BpeTokenizer::for_model("gpt-3.5-turbo").unwrap();
        let first = tokenizer.tokenize("Another important scene").unwrap();
        let second = tokenizer.tokenize("Another important scene").unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        let tokenizer = BpeTokenizer::for_model("gpt-3.5-turbo").unwrap();
        assert_eq!(tokenizer.tokenize("").unwrap(), Vec::<TokenId>::new());
        assert_eq!(tokenizer.count_tokens("").unwrap(), 0);
    }

    #[test]
    fn test_unknown_profile() {
        let result = BpeTokenizer::for_model("definitely-not-a-model");
        assert!(matches!(
            result,
            Err(EmbeddingError::UnknownModelProfile { .. })
        ));
    }

    #[test]
    fn test_reserved_token_rejected() {
        let tokenizer = BpeTokenizer::for_model("gpt-3.5-turbo").unwrap();
        let result = tokenizer.tokenize("the end<|endoftext|>");
        assert!(matches!(result, Err(EmbeddingError::Tokenizer { .. })));
    }
}
