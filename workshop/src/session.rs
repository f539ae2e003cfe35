//! A workshop chat session with retrieval-augmented turns.

use tracing::{debug, info, warn};
use writingway_embeddings::{
    BpeTokenizer, EmbeddingIndex, EntryId, FlatIndex, TextEncoder, TokenEncoder, Tokenizer,
};

use crate::config::WorkshopConfig;
use crate::conversation::{ChatMessage, ConversationHistory};
use crate::error::{Result, WorkshopError};

/// A prepared turn, ready to be sent to a completion model.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// Messages to send: the history so far plus the augmented user message.
    pub payload: ConversationHistory,

    /// The user's message as typed, without any added context.
    pub user_message: String,

    /// Earlier chunks retrieved for this message, nearest first.
    pub retrieved: Vec<String>,

    /// Tokens used by the payload.
    pub token_count: usize,

    /// Whether the payload exceeds the token limit and should be summarised.
    pub needs_summary: bool,
}

/// One workshop conversation and the chunk memory it draws on.
///
/// Every completed user message is remembered in the embedding index. Later
/// turns pull the nearest remembered messages into the prompt. Starting a new
/// conversation clears the history but keeps the memory.
///
/// `E` turns messages into vectors; `T` counts tokens for the history budget.
#[derive(Debug)]
pub struct WorkshopSession<E = TokenEncoder, T = BpeTokenizer> {
    config: WorkshopConfig,
    index: EmbeddingIndex<E, FlatIndex>,
    tokenizer: T,
    history: ConversationHistory,
}

impl WorkshopSession {
    /// Create a session using the configured tokenizer profile.
    pub fn new(config: WorkshopConfig) -> Result<Self> {
        config.validate()?;
        let profile = config.embedding.model_profile.as_str();
        let encoder = TokenEncoder::for_model(profile, config.embedding.dimension)?;
        let tokenizer = BpeTokenizer::for_model(profile)?;
        Self::with_encoder(config, encoder, tokenizer)
    }
}

impl<T: Tokenizer + Clone> WorkshopSession<TokenEncoder<T>, T> {
    /// Create a session that encodes and counts with the same tokenizer.
    pub fn with_tokenizer(config: WorkshopConfig, tokenizer: T) -> Result<Self> {
        let encoder = TokenEncoder::new(tokenizer.clone(), config.embedding.dimension)?;
        Self::with_encoder(config, encoder, tokenizer)
    }
}

impl<E: TextEncoder, T: Tokenizer> WorkshopSession<E, T> {
    /// Create a session around a custom encoder.
    ///
    /// The encoder must produce vectors of `embedding.dimension` values.
    pub fn with_encoder(config: WorkshopConfig, encoder: E, tokenizer: T) -> Result<Self> {
        config.validate()?;

        let backend = FlatIndex::with_metric(config.embedding.dimension, config.embedding.metric)?;
        let index = EmbeddingIndex::with_backend(encoder, backend)?;

        info!(
            "Workshop session ready (profile {}, k={})",
            tokenizer.profile(),
            config.retrieval.k
        );
        Ok(Self {
            config,
            index,
            tokenizer,
            history: ConversationHistory::new(),
        })
    }

    /// Build the payload for a user message.
    ///
    /// `selected_context` is extra text the user picked for this turn. Nothing
    /// is recorded until [`WorkshopSession::complete_turn`].
    pub fn prepare_turn(
        &self,
        user_message: &str,
        selected_context: Option<&str>,
    ) -> Result<TurnRequest> {
        let message = user_message.trim();
        if message.is_empty() {
            return Err(WorkshopError::EmptyMessage);
        }

        let retrieved = self.index.query(message, self.config.retrieval.k)?;

        let mut content = message.to_string();
        if let Some(context) = selected_context.filter(|c| !c.trim().is_empty()) {
            content.push_str("\n\nContext:\n");
            content.push_str(context);
        }
        if !retrieved.is_empty() {
            content.push_str("\n[Retrieved Context]:\n");
            content.push_str(&retrieved.join("\n"));
        }

        let mut payload = self.history.clone();
        if payload.is_empty() {
            if let Some(prompt) = &self.config.system_prompt {
                payload.push(ChatMessage::system(prompt.as_str()));
            }
        }
        payload.push(ChatMessage::user(content));

        let token_count = payload.estimate_tokens(&self.tokenizer)?;
        let needs_summary = token_count > self.config.history.token_limit;
        debug!(
            "Prepared turn with {} retrieved chunks, {token_count} tokens",
            retrieved.len()
        );

        Ok(TurnRequest {
            payload,
            user_message: message.to_string(),
            retrieved,
            token_count,
            needs_summary,
        })
    }

    /// Prompt asking a model to summarise the conversation before `turn`.
    ///
    /// The new user message is left out; it survives the summary as is.
    pub fn summarization_prompt(&self, turn: &TurnRequest) -> String {
        let mut earlier = turn.payload.clone();
        earlier.pop();
        earlier.summarization_prompt(&self.config.history.summary_prefix)
    }

    /// Collapse the payload of `turn` to its first message and `summary`,
    /// followed by the new user message.
    pub fn apply_summary(&self, turn: &mut TurnRequest, summary: impl Into<String>) -> Result<()> {
        let current = turn.payload.pop();
        turn.payload.collapse_with_summary(summary);
        if let Some(message) = current {
            turn.payload.push(message);
        }

        turn.token_count = turn.payload.estimate_tokens(&self.tokenizer)?;
        turn.needs_summary = false;
        if turn.token_count > self.config.history.token_limit {
            warn!(
                "Summarized turn still uses {} tokens (limit {})",
                turn.token_count, self.config.history.token_limit
            );
        }
        info!("Conversation summarized to {} tokens", turn.token_count);
        Ok(())
    }

    /// Record the model's reply and remember the user's message.
    ///
    /// The message is indexed first; if that fails the session is unchanged.
    pub fn complete_turn(
        &mut self,
        turn: TurnRequest,
        assistant_response: impl Into<String>,
    ) -> Result<EntryId> {
        let id = self.index.add_text(turn.user_message)?;

        self.history = turn.payload;
        self.history.push(ChatMessage::assistant(assistant_response));
        debug!("Completed turn, remembered as entry {id}");
        Ok(id)
    }

    /// Remember a chunk of text without a chat turn, e.g. scene notes.
    pub fn remember(&mut self, text: &str) -> Result<EntryId> {
        self.index.add_text(text).map_err(WorkshopError::from)
    }

    /// Prune the history to the configured token limit.
    pub fn prune_history(&mut self) -> Result<usize> {
        self.history.prune_to_limit(
            &self.tokenizer,
            self.config.history.token_limit,
            &self.config.history.protected_marker,
        )
    }

    /// Start a new conversation. Remembered chunks are kept.
    pub fn reset(&mut self) {
        self.history.clear();
        info!("Started new workshop conversation");
    }

    /// Continue a saved conversation. Remembered chunks are kept.
    pub fn resume(&mut self, history: ConversationHistory) {
        info!("Resumed conversation with {} messages", history.len());
        self.history = history;
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn index(&self) -> &EmbeddingIndex<E, FlatIndex> {
        &self.index
    }

    pub fn config(&self) -> &WorkshopConfig {
        &self.config
    }
}
