//! Error taxonomy for the connector.
//!
//! Every failure class the remote API or the local store can produce
//! maps to exactly one variant. Nothing in this crate retries or
//! swallows an error; everything propagates to the immediate caller.

use thiserror::Error;

/// Errors from the GigaChat connector.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The supplied auth credential is not base64(`client_id:client_secret`).
    #[error("auth credential is not a valid base64-encoded client_id:client_secret pair")]
    InvalidCredential,

    /// Unexpected 4xx-class HTTP status without structured detail.
    #[error("bad request: HTTP {status}")]
    BadRequest { status: u16 },

    /// Structured 401 with the server-provided code and message.
    ///
    /// Kept distinct from [`ConnectorError::BadRequest`] because a
    /// caller may want to prompt for re-authentication.
    #[error("authorization error: {message}")]
    Authorization { code: Option<i64>, message: String },

    /// HTTP 429 from the completion endpoint.
    #[error("rate limit exceeded")]
    RateLimited,

    /// HTTP 5xx.
    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    /// Missing file or unknown model.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP 422 with the server-provided validation message.
    #[error("validation error: {0}")]
    Validation(String),

    /// Chat id collision on create.
    #[error("chat '{0}' already exists")]
    Duplicate(String),

    /// HTTP 403 from the balance endpoint.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A session operation that needs an active chat was called before
    /// `select_chat`.
    #[error("no chat selected")]
    NoActiveChat,

    /// Required configuration is missing.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure (connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// Store file I/O failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        ConnectorError::Http(err.to_string())
    }
}
