//! # Workshop
//!
//! Chat memory for the Writingway workshop. Every user message is remembered
//! in an embedding index; later messages pull the most similar earlier
//! chunks back into the prompt while the conversation is kept inside a
//! token budget.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Workshop Session                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  user message ──► EmbeddingIndex::query ──► TurnRequest         │
//! │                                                 │               │
//! │  ConversationHistory ◄── complete_turn ◄── model reply          │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  prune / summarize (token limit)    ConversationStore (JSON)    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use writingway_workshop::{ConversationStore, WorkshopConfig, WorkshopSession};
//!
//! let mut session = WorkshopSession::new(WorkshopConfig::default())?;
//! let turn = session.prepare_turn("What happened in the key scene?", None)?;
//! let reply = send_to_model(&turn.payload);
//! session.complete_turn(turn, reply)?;
//!
//! let mut store = ConversationStore::load("conversations.json")?;
//! store.update_current(session.history().clone());
//! store.save("conversations.json")?;
//! ```

pub mod config;
pub mod conversation;
pub mod corpus;
pub mod error;
pub mod session;
pub mod store;

pub use config::{
    EmbeddingConfig, EmbeddingSource, HistoryConfig, RemoteEmbeddingConfig, RetrievalConfig,
    WorkshopConfig,
};
pub use conversation::{ChatMessage, ConversationHistory, Role};
pub use corpus::{corpus_chunks, remote_provider, search_corpus, search_corpus_remote};
pub use error::{Result, WorkshopError};
pub use session::{TurnRequest, WorkshopSession};
pub use store::{ConversationStore, FIRST_CONVERSATION};

// Re-export from dependencies for convenience
pub use writingway_embeddings::{DistanceMetric, EmbeddingIndex, QueryMatch};
