//! Completion and balance endpoints.
//!
//! [`CompletionClient`] replays the full conversation history to the
//! chat-completions endpoint and extracts the first choice. The status
//! taxonomy is mapped variant-for-variant; nothing is retried here.

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;

use crate::error::ConnectorError;
use crate::store::Message;
use crate::token::AccessToken;
use crate::wire::{ApiErrorBody, BalanceResponse, CompletionRequest, CompletionResponse};

/// Bearer-authenticated client for the completion and balance endpoints.
#[derive(Debug)]
pub struct CompletionClient {
    client: Client,
    api_base_url: String,
    model: String,
}

impl CompletionClient {
    /// Create a client over an already-built blocking HTTP client.
    pub fn new(client: Client, api_base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            model: model.into(),
        }
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Send the ordered message history and return the assistant reply
    /// from the first choice.
    pub fn complete(
        &self,
        token: &AccessToken,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<Message, ConnectorError> {
        let url = self.url("chat/completions");
        tracing::debug!(%url, messages = messages.len(), max_tokens, "requesting completion");

        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
        };
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .json(&request)
            .send()?;

        let status = response.status().as_u16();
        match status {
            200 => {
                let body: CompletionResponse = response
                    .json()
                    .map_err(|e| ConnectorError::Parse(e.to_string()))?;
                body.choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message)
                    .ok_or_else(|| ConnectorError::Parse("no choices in response".to_string()))
            }
            401 => {
                let body: ApiErrorBody = response
                    .json()
                    .map_err(|e| ConnectorError::Parse(e.to_string()))?;
                Err(ConnectorError::Authorization {
                    code: body.code,
                    message: body.message,
                })
            }
            400 => Err(ConnectorError::BadRequest { status }),
            404 => Err(ConnectorError::NotFound(format!(
                "no such model '{}'",
                self.model
            ))),
            422 => {
                let body: ApiErrorBody = response
                    .json()
                    .map_err(|e| ConnectorError::Parse(e.to_string()))?;
                Err(ConnectorError::Validation(body.message))
            }
            429 => Err(ConnectorError::RateLimited),
            500 => Err(ConnectorError::Server { status }),
            status => Err(ConnectorError::BadRequest { status }),
        }
    }

    /// Remaining token balance for the configured model.
    ///
    /// When no balance entry's `usage` matches the model name the value
    /// of the first entry is returned.
    pub fn balance(&self, token: &AccessToken) -> Result<i64, ConnectorError> {
        let url = self.url("balance");
        tracing::debug!(%url, "requesting balance");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .send()?;

        let status = response.status().as_u16();
        match status {
            200 => {
                let body: BalanceResponse = response
                    .json()
                    .map_err(|e| ConnectorError::Parse(e.to_string()))?;
                body.balance
                    .iter()
                    .find(|entry| entry.usage == self.model)
                    .or_else(|| body.balance.first())
                    .map(|entry| entry.value)
                    .ok_or_else(|| ConnectorError::Parse("empty balance list".to_string()))
            }
            401 => {
                let body: ApiErrorBody = response
                    .json()
                    .map_err(|e| ConnectorError::Parse(e.to_string()))?;
                Err(ConnectorError::Authorization {
                    code: body.code,
                    message: body.message,
                })
            }
            403 => Err(ConnectorError::PermissionDenied(
                "check your tarification type".to_string(),
            )),
            status => Err(ConnectorError::BadRequest { status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> CompletionClient {
        CompletionClient::new(
            Client::new(),
            "http://127.0.0.1:1/api/v1/",
            "GigaChat",
        )
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = test_client();
        assert_eq!(
            client.url("/chat/completions"),
            "http://127.0.0.1:1/api/v1/chat/completions"
        );
        assert_eq!(client.url("balance"), "http://127.0.0.1:1/api/v1/balance");
    }

    #[test]
    fn test_model_accessor() {
        assert_eq!(test_client().model(), "GigaChat");
    }
}
