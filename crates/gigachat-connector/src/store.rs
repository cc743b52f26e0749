//! Durable conversation store.
//!
//! Chats live in one JSON document: top-level keys are chat ids, each
//! value is the chronological array of role-tagged messages. The file
//! and the in-memory mapping stay synchronized by rewriting the full
//! document after every mutation; there is no write-behind and no
//! incremental log. Exactly one process is assumed to own the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConnectorError;

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Steering prompt, conventionally the first entry.
    System,
    User,
    Assistant,
}

/// A single conversation turn. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Mapping from chat id to its ordered message history, backed by a
/// JSON file that is flushed after every mutating operation.
#[derive(Debug)]
pub struct ChatStore {
    path: PathBuf,
    chats: BTreeMap<String, Vec<Message>>,
}

impl ChatStore {
    /// Open the store at `path`, treating a missing or empty file as an
    /// empty store. This is the constructor used at connector startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConnectorError> {
        let path = path.into();
        let chats = match fs::read_to_string(&path) {
            Ok(content) => parse_document(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, chats })
    }

    /// Reload the store from `path`, failing with
    /// [`ConnectorError::NotFound`] when the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConnectorError> {
        let path = path.into();
        if !path.exists() {
            return Err(ConnectorError::NotFound(format!(
                "chat store file {} does not exist",
                path.display()
            )));
        }
        let content = fs::read_to_string(&path)?;
        Ok(Self {
            chats: parse_document(&content)?,
            path,
        })
    }

    /// Serialize the full mapping and overwrite the backing file.
    ///
    /// Non-ASCII text is written literally; the document is
    /// pretty-printed for hand inspection.
    pub fn save(&self) -> Result<(), ConnectorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let document = serde_json::to_string_pretty(&self.chats)
            .map_err(|e| ConnectorError::Parse(e.to_string()))?;
        fs::write(&self.path, document)?;
        tracing::debug!(path = %self.path.display(), chats = self.chats.len(), "store flushed");
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a chat with this id exists.
    pub fn chat_exists(&self, chat_id: &str) -> bool {
        self.chats.contains_key(chat_id)
    }

    /// All known chat ids.
    pub fn chat_ids(&self) -> Vec<&str> {
        self.chats.keys().map(String::as_str).collect()
    }

    /// Create an empty chat and persist.
    ///
    /// Fails with [`ConnectorError::Duplicate`] when the id is taken;
    /// the store is left untouched in that case.
    pub fn add_chat(&mut self, chat_id: &str) -> Result<(), ConnectorError> {
        if self.chat_exists(chat_id) {
            return Err(ConnectorError::Duplicate(chat_id.to_string()));
        }
        self.chats.insert(chat_id.to_string(), Vec::new());
        self.save()
    }

    /// Append a message to a chat and persist.
    pub fn add_message(&mut self, chat_id: &str, message: Message) -> Result<(), ConnectorError> {
        let chat = self.chats.get_mut(chat_id).ok_or_else(|| {
            ConnectorError::NotFound(format!("chat '{chat_id}' does not exist"))
        })?;
        chat.push(message);
        self.save()
    }

    /// Messages of a chat in chronological order; an unknown id yields
    /// an empty slice, not an error.
    pub fn messages_of(&self, chat_id: &str) -> &[Message] {
        self.chats.get(chat_id).map_or(&[], Vec::as_slice)
    }
}

fn parse_document(content: &str) -> Result<BTreeMap<String, Vec<Message>>, ConnectorError> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(content).map_err(|e| ConnectorError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("chats.json")
    }

    #[test]
    fn test_open_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = ChatStore::open(store_path(&dir)).unwrap();
        assert!(store.chat_ids().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = ChatStore::load(store_path(&dir));
        assert!(matches!(result, Err(ConnectorError::NotFound(_))));
    }

    #[test]
    fn test_open_whitespace_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "  \n\t ").unwrap();
        let store = ChatStore::open(&path).unwrap();
        assert!(store.chat_ids().is_empty());
    }

    #[test]
    fn test_save_load_round_trip_preserves_order_and_unicode() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = ChatStore::open(&path).unwrap();
        store.add_chat("поэзия").unwrap();
        store
            .add_message("поэзия", Message::system("Отвечай стихами"))
            .unwrap();
        store
            .add_message("поэзия", Message::user("Привет! ¿Qué tal? 你好"))
            .unwrap();
        store
            .add_message("поэзия", Message::assistant("Здравствуй"))
            .unwrap();

        // Non-ASCII must be stored literally, not \u-escaped.
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Привет"));
        assert!(raw.contains("你好"));

        let reloaded = ChatStore::load(&path).unwrap();
        let messages = reloaded.messages_of("поэзия");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "Привет! ¿Qué tal? 你好");
        assert_eq!(messages[2].role, Role::Assistant);
    }

    #[test]
    fn test_add_chat_twice_fails_and_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = ChatStore::open(store_path(&dir)).unwrap();

        store.add_chat("x").unwrap();
        store.add_message("x", Message::user("hello")).unwrap();

        let result = store.add_chat("x");
        assert!(matches!(result, Err(ConnectorError::Duplicate(_))));
        assert_eq!(store.messages_of("x").len(), 1);
    }

    #[test]
    fn test_messages_of_unknown_chat_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ChatStore::open(store_path(&dir)).unwrap();
        assert!(store.messages_of("nope").is_empty());
    }

    #[test]
    fn test_add_message_to_unknown_chat_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = ChatStore::open(store_path(&dir)).unwrap();
        let result = store.add_message("nope", Message::user("hi"));
        assert!(matches!(result, Err(ConnectorError::NotFound(_))));
    }

    #[test]
    fn test_every_mutation_is_flushed() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = ChatStore::open(&path).unwrap();
        store.add_chat("x").unwrap();
        assert!(ChatStore::load(&path).unwrap().chat_exists("x"));

        store.add_message("x", Message::user("ping")).unwrap();
        let on_disk = ChatStore::load(&path).unwrap();
        assert_eq!(on_disk.messages_of("x"), store.messages_of("x"));
    }

    #[test]
    fn test_role_serialization_is_lowercase() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
    }
}
