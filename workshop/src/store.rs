//! Named workshop conversations saved as JSON.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::conversation::ConversationHistory;
use crate::error::{Result, WorkshopError};

/// Name of the conversation a fresh store starts with.
pub const FIRST_CONVERSATION: &str = "Chat 1";

/// Every workshop conversation by name, in creation order.
///
/// One conversation is always selected, so the store is never empty. On
/// disk it is a JSON object mapping each name to its list of messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationStore {
    conversations: IndexMap<String, ConversationHistory>,
    current: String,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// A store holding one empty conversation named [`FIRST_CONVERSATION`].
    pub fn new() -> Self {
        let mut conversations = IndexMap::new();
        conversations.insert(FIRST_CONVERSATION.to_string(), ConversationHistory::new());
        Self {
            conversations,
            current: FIRST_CONVERSATION.to_string(),
        }
    }

    /// Load saved conversations. The first one becomes current.
    ///
    /// A missing file or an empty object gives a fresh store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "No saved conversations at {}, starting fresh",
                path.display()
            );
            return Ok(Self::new());
        }

        let json = fs::read_to_string(path)?;
        let conversations: IndexMap<String, ConversationHistory> = serde_json::from_str(&json)?;
        let Some(current) = conversations.keys().next().cloned() else {
            return Ok(Self::new());
        };

        info!(
            "Loaded {} conversations from {}",
            conversations.len(),
            path.display()
        );
        Ok(Self {
            conversations,
            current,
        })
    }

    /// Write every conversation to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.conversations)?;
        fs::write(path, json)?;
        debug!(
            "Saved {} conversations to {}",
            self.conversations.len(),
            path.display()
        );
        Ok(())
    }

    /// Conversation names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.conversations.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ConversationHistory> {
        self.conversations.get(name)
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// History of the selected conversation.
    pub fn current(&self) -> &ConversationHistory {
        &self.conversations[self.current.as_str()]
    }

    /// Select a conversation and return its history.
    pub fn select(&mut self, name: &str) -> Result<&ConversationHistory> {
        let history = self
            .conversations
            .get(name)
            .ok_or_else(|| WorkshopError::UnknownConversation(name.to_string()))?;
        self.current = name.to_string();
        Ok(history)
    }

    /// Replace the history of the selected conversation.
    pub fn update_current(&mut self, history: ConversationHistory) {
        self.conversations.insert(self.current.clone(), history);
    }

    /// Start an empty conversation named `Chat N` and select it.
    pub fn new_conversation(&mut self) -> &str {
        let mut number = self.conversations.len() + 1;
        let mut name = format!("Chat {number}");
        while self.conversations.contains_key(&name) {
            number += 1;
            name = format!("Chat {number}");
        }

        self.conversations
            .insert(name.clone(), ConversationHistory::new());
        info!("Started conversation {name}");
        self.current = name;
        &self.current
    }

    /// Rename a conversation in place. The new name is trimmed.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(WorkshopError::EmptyConversationName);
        }
        if new_name == name {
            return Ok(());
        }
        if self.conversations.contains_key(new_name) {
            return Err(WorkshopError::ConversationExists(new_name.to_string()));
        }

        let (position, _, history) = self
            .conversations
            .shift_remove_full(name)
            .ok_or_else(|| WorkshopError::UnknownConversation(name.to_string()))?;
        self.conversations
            .shift_insert(position, new_name.to_string(), history);
        if self.current == name {
            self.current = new_name.to_string();
        }

        info!("Renamed conversation {name} to {new_name}");
        Ok(())
    }

    /// Delete a conversation.
    ///
    /// Deleting the selected conversation selects the first remaining one,
    /// or a new empty [`FIRST_CONVERSATION`] when none remain.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if self.conversations.shift_remove(name).is_none() {
            return Err(WorkshopError::UnknownConversation(name.to_string()));
        }

        if self.current == name {
            let first = self.conversations.keys().next().cloned();
            self.current = match first {
                Some(first) => first,
                None => {
                    self.conversations
                        .insert(FIRST_CONVERSATION.to_string(), ConversationHistory::new());
                    FIRST_CONVERSATION.to_string()
                }
            };
        }

        info!("Deleted conversation {name}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ChatMessage;
    use pretty_assertions::assert_eq;

    fn names(store: &ConversationStore) -> Vec<&str> {
        store.names().collect()
    }

    fn history(text: &str) -> ConversationHistory {
        ConversationHistory::from_messages(vec![ChatMessage::user(text)])
    }

    #[test]
    fn test_new_store_has_first_chat() {
        let store = ConversationStore::new();
        assert_eq!(names(&store), ["Chat 1"]);
        assert_eq!(store.current_name(), "Chat 1");
        assert!(store.current().is_empty());
    }

    #[test]
    fn test_new_conversation_numbering() {
        let mut store = ConversationStore::new();
        assert_eq!(store.new_conversation(), "Chat 2");

        store.rename("Chat 1", "Harbour").unwrap();
        assert_eq!(store.new_conversation(), "Chat 3");

        store.delete("Harbour").unwrap();
        assert_eq!(names(&store), ["Chat 2", "Chat 3"]);
        assert_eq!(store.new_conversation(), "Chat 4");
        assert_eq!(store.current_name(), "Chat 4");
    }

    #[test]
    fn test_update_and_select() {
        let mut store = ConversationStore::new();
        store.update_current(history("first"));
        store.new_conversation();
        store.update_current(history("second"));

        assert_eq!(store.select("Chat 1").unwrap(), &history("first"));
        assert_eq!(store.current_name(), "Chat 1");
        assert!(matches!(
            store.select("Chat 9"),
            Err(WorkshopError::UnknownConversation(_))
        ));
        assert_eq!(store.current_name(), "Chat 1");
    }

    #[test]
    fn test_rename_keeps_position_and_selection() {
        let mut store = ConversationStore::new();
        store.new_conversation();
        store.select("Chat 1").unwrap();

        store.rename("Chat 1", "  Storm scene ").unwrap();
        assert_eq!(names(&store), ["Storm scene", "Chat 2"]);
        assert_eq!(store.current_name(), "Storm scene");

        assert!(matches!(
            store.rename("Chat 2", "Storm scene"),
            Err(WorkshopError::ConversationExists(_))
        ));
        assert!(matches!(
            store.rename("Chat 2", "   "),
            Err(WorkshopError::EmptyConversationName)
        ));
        assert!(matches!(
            store.rename("Chat 7", "Other"),
            Err(WorkshopError::UnknownConversation(_))
        ));
    }

    #[test]
    fn test_delete_current_falls_back_to_first() {
        let mut store = ConversationStore::new();
        store.update_current(history("kept"));
        store.new_conversation();
        store.new_conversation();

        store.delete("Chat 3").unwrap();
        assert_eq!(store.current_name(), "Chat 1");
        assert_eq!(store.current(), &history("kept"));

        store.delete("Chat 2").unwrap();
        assert_eq!(store.current_name(), "Chat 1");
        assert!(store.delete("Chat 2").is_err());
    }

    #[test]
    fn test_delete_last_starts_fresh_chat() {
        let mut store = ConversationStore::new();
        store.rename("Chat 1", "Only").unwrap();
        store.update_current(history("gone"));

        store.delete("Only").unwrap();
        assert_eq!(names(&store), ["Chat 1"]);
        assert_eq!(store.current_name(), "Chat 1");
        assert!(store.current().is_empty());
    }

    #[test]
    fn test_save_and_load_keep_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workshop").join("conversations.json");

        let mut store = ConversationStore::new();
        for _ in 0..10 {
            store.new_conversation();
        }
        store.update_current(history("latest"));
        store.rename("Chat 1", "Zephyr").unwrap();
        store.save(&path).unwrap();

        let loaded = ConversationStore::load(&path).unwrap();
        assert_eq!(names(&loaded), names(&store));
        assert_eq!(loaded.current_name(), "Zephyr");
        assert_eq!(loaded.get("Chat 11"), Some(&history("latest")));
    }

    #[test]
    fn test_saved_file_maps_names_to_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.json");

        let mut store = ConversationStore::new();
        store.update_current(history("hello"));
        store.save(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "Chat 1": [{ "role": "user", "content": "hello" }] })
        );
    }

    #[test]
    fn test_load_missing_empty_and_malformed() {
        let dir = tempfile::tempdir().unwrap();

        let missing = ConversationStore::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(missing, ConversationStore::new());

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "{}").unwrap();
        assert_eq!(
            ConversationStore::load(&empty).unwrap(),
            ConversationStore::new()
        );

        let malformed = dir.path().join("bad.json");
        fs::write(&malformed, "{ not json").unwrap();
        assert!(matches!(
            ConversationStore::load(&malformed),
            Err(WorkshopError::Serialization(_))
        ));
    }
}
