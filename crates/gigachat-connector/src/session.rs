//! Chat session controller.
//!
//! [`ChatSession`] composes the token manager, the conversation store
//! and the completion client behind the public contract the terminal
//! front end consumes. It owns the single "current chat" pointer: the
//! session starts with no chat selected and every history-touching
//! operation requires one.

use reqwest::blocking::Client;

use crate::client::CompletionClient;
use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::store::{ChatStore, Message};
use crate::token::TokenManager;

/// Menu-facing chat session over one conversation store.
///
/// Construction takes the configuration by ownership; the credential
/// inside it has already passed the structural check, so a malformed
/// credential never reaches the network.
#[derive(Debug)]
pub struct ChatSession {
    store: ChatStore,
    tokens: TokenManager,
    client: CompletionClient,
    max_tokens: u32,
    current: Option<String>,
}

impl ChatSession {
    /// Build the session: open the store and prepare the HTTP clients.
    ///
    /// The HTTP client skips TLS certificate verification. The GigaChat
    /// endpoints present a certificate chain outside the default root
    /// store; accepting it is an explicit trust decision carried over
    /// from the service contract, not an oversight.
    pub fn new(config: ConnectorConfig) -> Result<Self, ConnectorError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout)
            .build()?;

        let store = ChatStore::open(&config.chats_path)?;
        let tokens = TokenManager::new(
            http.clone(),
            config.credential,
            config.scope,
            config.oauth_url,
        );
        let client = CompletionClient::new(http, config.api_base_url, config.model);

        Ok(Self {
            store,
            tokens,
            client,
            max_tokens: config.max_tokens,
            current: None,
        })
    }

    /// Eagerly issue the first access token.
    ///
    /// Optional: `ask` and `balance` fetch tokens lazily, but calling
    /// this at startup surfaces credential problems before the first
    /// question is typed.
    pub fn authorize(&mut self) -> Result<(), ConnectorError> {
        self.tokens.current_token().map(|_| ())
    }

    /// The currently selected chat id, if any.
    pub fn current_chat(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// All known chat ids.
    pub fn chat_ids(&self) -> Vec<&str> {
        self.store.chat_ids()
    }

    /// Whether a chat with this id exists in the store.
    pub fn chat_exists(&self, chat_id: &str) -> bool {
        self.store.chat_exists(chat_id)
    }

    /// Create a new empty chat without selecting it.
    ///
    /// Fails with [`ConnectorError::Duplicate`] when the id is taken.
    pub fn add_chat(&mut self, chat_id: &str) -> Result<(), ConnectorError> {
        self.store.add_chat(chat_id)
    }

    /// Select a chat, creating it first when it does not exist yet.
    pub fn select_chat(&mut self, chat_id: &str) -> Result<(), ConnectorError> {
        if !self.store.chat_exists(chat_id) {
            self.store.add_chat(chat_id)?;
            tracing::info!(chat = chat_id, "chat created");
        }
        self.current = Some(chat_id.to_string());
        Ok(())
    }

    /// Append a system prompt to the active chat and persist.
    pub fn add_system_prompt(&mut self, text: impl Into<String>) -> Result<(), ConnectorError> {
        let chat_id = self.active_chat()?;
        self.store.add_message(&chat_id, Message::system(text))
    }

    /// Message history of the active chat.
    pub fn get_messages(&self) -> Result<&[Message], ConnectorError> {
        let chat_id = self.current.as_deref().ok_or(ConnectorError::NoActiveChat)?;
        Ok(self.store.messages_of(chat_id))
    }

    /// Ask the model a question within the active chat.
    ///
    /// Appends the user turn and persists, then sends the full history
    /// and appends the returned assistant turn (second persist). When
    /// the completion request fails the user turn stays recorded and no
    /// assistant turn is written.
    pub fn ask(&mut self, text: impl Into<String>) -> Result<String, ConnectorError> {
        let chat_id = self.active_chat()?;
        self.store.add_message(&chat_id, Message::user(text))?;

        let token = self.tokens.current_token()?;
        let reply = self
            .client
            .complete(&token, self.store.messages_of(&chat_id), self.max_tokens)?;
        let content = reply.content.clone();

        self.store.add_message(&chat_id, reply)?;
        tracing::info!(chat = %chat_id, "assistant turn recorded");
        Ok(content)
    }

    /// Remaining token balance for the configured model.
    pub fn balance(&mut self) -> Result<i64, ConnectorError> {
        let token = self.tokens.current_token()?;
        self.client.balance(&token)
    }

    fn active_chat(&self) -> Result<String, ConnectorError> {
        self.current.clone().ok_or(ConnectorError::NoActiveChat)
    }
}
