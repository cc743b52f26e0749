//! Connector configuration.
//!
//! One explicit struct constructed at process start and handed into
//! [`ChatSession`](crate::session::ChatSession) by ownership. There is
//! no ambient global configuration anywhere in the crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::credential::{ApiScope, AuthCredential};
use crate::error::ConnectorError;

/// Environment variable holding the base64 auth credential.
pub const AUTH_TOKEN_ENV: &str = "GIGACHAT_AUTH_TOKEN";
/// Environment variable selecting the API scope (`PERS`, `B2B`, `CORP`).
pub const API_SCOPE_ENV: &str = "GIGACHAT_API_SCOPE";
/// Environment variable overriding the chat store path.
pub const CHATS_JSON_ENV: &str = "GIGACHAT_CHATS_JSON";
/// Environment variable overriding the per-reply token budget.
pub const MAX_TOKENS_ENV: &str = "GIGACHAT_MAX_TOKENS";

const DEFAULT_OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
const DEFAULT_API_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
const DEFAULT_MODEL: &str = "GigaChat";
const DEFAULT_CHATS_PATH: &str = "./data/gigachat_chats.json";
const DEFAULT_MAX_TOKENS: u32 = 100;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hosted LLM providers this connector can talk to.
///
/// Only GigaChat is modeled today; the tag exists so configuration can
/// name the provider once more are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    GigaChat,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::GigaChat => f.write_str("gigachat"),
        }
    }
}

/// Configuration for the GigaChat connector.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Which hosted provider this configuration targets.
    pub provider: LlmProvider,

    /// Validated base64 auth credential.
    pub credential: AuthCredential,

    /// OAuth permission tier sent to the token endpoint.
    pub scope: ApiScope,

    /// Path of the JSON chat store.
    pub chats_path: PathBuf,

    /// Maximum tokens requested per completion.
    pub max_tokens: u32,

    /// OAuth token endpoint.
    pub oauth_url: String,

    /// Base URL for the completion and balance endpoints.
    pub api_base_url: String,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl ConnectorConfig {
    /// Create a configuration with production endpoints and defaults.
    pub fn new(credential: AuthCredential) -> Self {
        Self {
            provider: LlmProvider::GigaChat,
            credential,
            scope: ApiScope::default(),
            chats_path: PathBuf::from(DEFAULT_CHATS_PATH),
            max_tokens: DEFAULT_MAX_TOKENS,
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `GIGACHAT_AUTH_TOKEN` is required; the remaining variables fall
    /// back to defaults when unset.
    pub fn from_env() -> Result<Self, ConnectorError> {
        let raw = std::env::var(AUTH_TOKEN_ENV).map_err(|_| {
            ConnectorError::NotConfigured(format!(
                "auth credential not set: configure '{AUTH_TOKEN_ENV}' environment variable"
            ))
        })?;
        let mut config = Self::new(AuthCredential::new(raw)?);

        if let Ok(scope) = std::env::var(API_SCOPE_ENV) {
            config.scope = scope.parse()?;
        }
        if let Ok(path) = std::env::var(CHATS_JSON_ENV) {
            config.chats_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var(MAX_TOKENS_ENV) {
            config.max_tokens = raw.parse().map_err(|_| {
                ConnectorError::NotConfigured(format!(
                    "{MAX_TOKENS_ENV} must be a positive integer, got '{raw}'"
                ))
            })?;
        }
        Ok(config)
    }

    /// Set the API scope.
    pub fn with_scope(mut self, scope: ApiScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the chat store path.
    pub fn with_chats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chats_path = path.into();
        self
    }

    /// Set the per-reply token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set a custom OAuth endpoint.
    pub fn with_oauth_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_url = url.into();
        self
    }

    /// Set a custom API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    fn test_credential() -> AuthCredential {
        let raw = BASE64.encode(
            "0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9:f9e8d7c6-b5a4-9382-7160-5f4e3d2c1b0a",
        );
        AuthCredential::new(raw).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ConnectorConfig::new(test_credential());
        assert_eq!(config.provider, LlmProvider::GigaChat);
        assert_eq!(config.provider.to_string(), "gigachat");
        assert_eq!(config.scope, ApiScope::Personal);
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.model, "GigaChat");
        assert!(config.oauth_url.contains("ngw.devices.sberbank.ru"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConnectorConfig::new(test_credential())
            .with_scope(ApiScope::Corporate)
            .with_max_tokens(512)
            .with_api_base_url("http://127.0.0.1:9000")
            .with_model("GigaChat-Pro");

        assert_eq!(config.scope, ApiScope::Corporate);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.model, "GigaChat-Pro");
    }
}
