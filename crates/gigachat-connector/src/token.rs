//! OAuth2 client-credentials token lifecycle.
//!
//! [`TokenManager`] exchanges the auth credential for a bearer access
//! token and refreshes it lazily on access: there is no background
//! refresh thread or timer, and an expired token is replaced wholesale
//! by the next [`TokenManager::current_token`] call.
//!
//! The token endpoint sits behind a certificate chain that is not in
//! the default root store, so TLS verification is disabled on the HTTP
//! client built in [`crate::session`]. This is a deliberate, documented
//! trust decision inherited from the service contract.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use uuid::Uuid;

use crate::credential::{ApiScope, AuthCredential};
use crate::error::ConnectorError;
use crate::wire::{ApiErrorBody, TokenResponse};

/// Epoch seconds of 9999-12-31T23:59:59Z. Values beyond this cannot be
/// a calendar date in seconds and are reinterpreted as milliseconds.
const MAX_EPOCH_SECS: i64 = 253_402_300_799;

/// A bearer access token with its expiry instant.
///
/// Never mutated in place: refresh replaces the whole value.
#[derive(Clone)]
pub struct AccessToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Wrap a raw token value and its expiry.
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at,
        }
    }

    /// Expose the token for use in an `Authorization: Bearer` header.
    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }

    /// When this token stops being accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is stale relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Convert an epoch value in second- or millisecond-resolution into a
/// UTC instant.
pub(crate) fn datetime_from_epoch(value: i64) -> Result<DateTime<Utc>, ConnectorError> {
    let secs = if value > MAX_EPOCH_SECS {
        value / 1000
    } else {
        value
    };
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ConnectorError::Parse(format!("expires_at {value} is out of range")))
}

/// Issues and lazily refreshes the bearer access token.
#[derive(Debug)]
pub struct TokenManager {
    client: Client,
    credential: AuthCredential,
    scope: ApiScope,
    oauth_url: String,
    token: Option<AccessToken>,
}

impl TokenManager {
    /// Create a manager over an already-built blocking HTTP client.
    pub fn new(
        client: Client,
        credential: AuthCredential,
        scope: ApiScope,
        oauth_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credential,
            scope,
            oauth_url: oauth_url.into(),
            token: None,
        }
    }

    /// Exchange the credential for a fresh access token.
    ///
    /// Sends the client-credentials request with a unique `RqUID`
    /// correlation header. Status mapping: 200 parses the token,
    /// 401 surfaces the server's code/message as
    /// [`ConnectorError::Authorization`], anything else is
    /// [`ConnectorError::BadRequest`].
    pub fn authorize(&self) -> Result<AccessToken, ConnectorError> {
        let rquid = Uuid::new_v4().to_string();
        tracing::debug!(url = %self.oauth_url, rquid = %rquid, "requesting access token");

        let response = self
            .client
            .post(&self.oauth_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header("RqUID", rquid)
            .header(
                AUTHORIZATION,
                format!("Basic {}", self.credential.expose()),
            )
            .form(&[("scope", self.scope.as_str())])
            .send()?;

        let status = response.status().as_u16();
        match status {
            200 => {
                let body: TokenResponse = response
                    .json()
                    .map_err(|e| ConnectorError::Parse(e.to_string()))?;
                let expires_at = datetime_from_epoch(body.expires_at)?;
                tracing::info!(%expires_at, "access token issued");
                Ok(AccessToken::new(body.access_token, expires_at))
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
            status => Err(ConnectorError::BadRequest { status }),
        }
    }

    /// The currently valid access token, re-authorizing first when no
    /// token has been issued yet or the held one has expired.
    ///
    /// This is the sole refresh path.
    pub fn current_token(&mut self) -> Result<AccessToken, ConnectorError> {
        let stale = self
            .token
            .as_ref()
            .map_or(true, |t| t.is_expired(Utc::now()));
        if stale {
            self.token = Some(self.authorize()?);
        }
        // Freshly set above when it was absent or stale.
        match &self.token {
            Some(token) => Ok(token.clone()),
            None => Err(ConnectorError::NotConfigured(
                "no access token issued".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_seconds() {
        let dt = datetime_from_epoch(1_700_000_000).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
    }

    #[test]
    fn test_epoch_milliseconds_are_reinterpreted() {
        // Same instant in milliseconds: beyond year 9999 as seconds.
        let secs = datetime_from_epoch(1_700_000_000).unwrap();
        let millis = datetime_from_epoch(1_700_000_000_000).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn test_epoch_far_out_of_range_is_an_error() {
        assert!(datetime_from_epoch(i64::MIN).is_err());
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let fresh = AccessToken::new("t", now + chrono::Duration::minutes(30));
        let stale = AccessToken::new("t", now - chrono::Duration::seconds(1));
        assert!(!fresh.is_expired(now));
        assert!(stale.is_expired(now));
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let token = AccessToken::new("very-secret-token", Utc::now());
        let debug = format!("{:?}", token);
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
