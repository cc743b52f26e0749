//! Wire types for the OAuth, completion and balance endpoints.

use serde::{Deserialize, Serialize};

use crate::store::Message;

/// Successful body from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Epoch value, second- or millisecond-resolution.
    pub expires_at: i64,
}

/// Structured error body returned with 401 responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// Completion request: the full conversation replayed verbatim.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Message,
}

/// Body from the balance endpoint: one entry per tariffed model.
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub balance: Vec<BalanceEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceEntry {
    pub usage: String,
    pub value: i64,
}
