//! # gigachat-connector
//!
//! Connector for the GigaChat hosted LLM API: OAuth2 client-credentials
//! token lifecycle, a JSON-backed conversation store, the completion and
//! balance endpoints, and the chat session controller that ties them
//! together.
//!
//! ## Key guarantees
//!
//! 1. **Synchronous**: blocking I/O throughout, one in-process actor.
//! 2. **Durable**: the store file is rewritten after every mutation.
//! 3. **No silent retries**: every failure maps to one
//!    [`ConnectorError`] variant and propagates to the caller.
//! 4. **Secrets stay secret**: credential and token values are
//!    redacted in `Debug` output.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gigachat_connector::{ChatSession, ConnectorConfig};
//!
//! let config = ConnectorConfig::from_env()?;
//! let mut session = ChatSession::new(config)?;
//!
//! session.select_chat("test")?;
//! session.add_system_prompt("Answer briefly.")?;
//! let reply = session.ask("How old are you?")?;
//! println!("{reply}");
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod session;
pub mod store;
pub mod token;

mod wire;

// Re-export main types at crate root
pub use client::CompletionClient;
pub use config::{ConnectorConfig, LlmProvider};
pub use credential::{is_valid_credential, ApiScope, AuthCredential};
pub use error::ConnectorError;
pub use session::ChatSession;
pub use store::{ChatStore, Message, Role};
pub use token::{AccessToken, TokenManager};
