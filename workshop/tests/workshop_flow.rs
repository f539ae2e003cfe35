//! Workshop sessions over the real BPE tokenizer and config files.

use std::io::Write;

use pretty_assertions::assert_eq;
use writingway_workshop::{
    ConversationStore, DistanceMetric, Role, WorkshopConfig, WorkshopSession,
};

#[test]
fn test_session_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
system_prompt = "You help novelists."

[embedding]
dimension = 64
metric = "euclidean"

[retrieval]
k = 2

[history]
token_limit = 500
"#
    )
    .unwrap();

    let config = WorkshopConfig::load(file.path()).unwrap();
    assert_eq!(config.embedding.dimension, 64);
    assert_eq!(config.embedding.metric, DistanceMetric::Euclidean);

    let session = WorkshopSession::new(config).unwrap();
    assert_eq!(session.index().dimension(), 64);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(WorkshopConfig::load(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_unknown_profile_fails_fast() {
    let mut config = WorkshopConfig::default();
    config.embedding.model_profile = "no-such-model".to_string();
    assert!(WorkshopSession::new(config).is_err());
}

#[test]
fn test_conversation_remembers_earlier_messages() {
    let mut session =
        WorkshopSession::new(WorkshopConfig::default().with_system_prompt("Be concise.")).unwrap();

    for (message, reply) in [
        ("This is the first conversation chunk.", "Noted."),
        ("Another important scene with key details.", "Got it."),
        ("A random off-topic discussion.", "Sure."),
    ] {
        let turn = session.prepare_turn(message, None).unwrap();
        session.complete_turn(turn, reply).unwrap();
    }

    assert_eq!(session.index().len(), 3);
    assert_eq!(session.history().len(), 7);

    let turn = session.prepare_turn("key details", None).unwrap();
    assert_eq!(turn.retrieved.len(), 3);

    let last = turn.payload.messages().last().unwrap();
    assert_eq!(last.role, Role::User);
    assert!(last.content.starts_with("key details\n[Retrieved Context]:\n"));
    assert!(last.content.contains("Another important scene with key details."));
    assert!(turn.token_count > 0);
}

#[test]
fn test_prune_history_respects_limit() {
    let mut session = WorkshopSession::new(
        WorkshopConfig::default()
            .with_system_prompt("Be concise.")
            .with_token_limit(20),
    )
    .unwrap();

    for message in [
        "The storm rolled in over the harbour at dusk.",
        "*Keep this:* the captain never lies.",
        "The crew argued about the cargo for hours.",
    ] {
        let turn = session.prepare_turn(message, None).unwrap();
        session.complete_turn(turn, "Understood, continue.").unwrap();
    }

    let removed = session.prune_history().unwrap();
    assert!(removed > 0);

    let messages = session.history().messages();
    assert_eq!(messages[0].content, "Be concise.");
    assert!(
        messages
            .iter()
            .any(|m| m.content.starts_with("*Keep this:*"))
    );
}

#[test]
fn test_conversations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversations.json");
    let config = WorkshopConfig::default().with_system_prompt("Be concise.");

    let mut store = ConversationStore::load(&path).unwrap();
    let mut session = WorkshopSession::new(config.clone()).unwrap();
    let turn = session
        .prepare_turn("The lighthouse keeper hides a letter.", None)
        .unwrap();
    session.complete_turn(turn, "A good secret.").unwrap();
    store.update_current(session.history().clone());

    store.new_conversation();
    session.reset();
    let turn = session.prepare_turn("Who is the keeper?", None).unwrap();
    assert!(
        turn.retrieved
            .contains(&"The lighthouse keeper hides a letter.".to_string())
    );
    session.complete_turn(turn, "An old sailor.").unwrap();
    store.update_current(session.history().clone());
    store.save(&path).unwrap();

    let mut store = ConversationStore::load(&path).unwrap();
    assert_eq!(store.names().collect::<Vec<_>>(), ["Chat 1", "Chat 2"]);
    assert_eq!(store.current_name(), "Chat 1");

    let mut session = WorkshopSession::new(config).unwrap();
    session.resume(store.select("Chat 2").unwrap().clone());
    let messages = session.history().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(
        messages[1].content,
        "Who is the keeper?\n[Retrieved Context]:\nThe lighthouse keeper hides a letter."
    );
}
