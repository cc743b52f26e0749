//! Secure handling and offline validation of the GigaChat auth credential.
//!
//! The credential is the base64 encoding of `client_id:client_secret`
//! where both halves are UUID-shaped. Validation is purely structural
//! and never touches the network.
//!
//! ## Security
//!
//! The credential value is wrapped in [`SecretString`] so it cannot
//! leak through `Debug` output; it is exposed only at the point where
//! the `Authorization` header is built.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;

use crate::error::ConnectorError;

lazy_static! {
    /// UUID-shaped secret half: 8-4-4-4-12 hex groups, case-insensitive.
    static ref UUID_SHAPE: Regex =
        Regex::new(r"(?i)^[a-z0-9]{8}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{12}$")
            .expect("static regex");
}

/// Structural check that a string is a validly formed auth credential.
///
/// Returns `false` if the string is not valid base64, if the decoded
/// bytes are not UTF-8 or contain no `:`, or if either half of the
/// `:`-split fails the UUID-shape pattern. Total: never panics, never
/// errors.
pub fn is_valid_credential(s: &str) -> bool {
    let decoded = match BASE64.decode(s) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let decoded = match String::from_utf8(decoded) {
        Ok(text) => text,
        Err(_) => return false,
    };
    let Some((client_id, client_secret)) = decoded.split_once(':') else {
        return false;
    };
    UUID_SHAPE.is_match(client_id) && UUID_SHAPE.is_match(client_secret)
}

/// A securely-stored GigaChat auth credential.
///
/// Construction via [`AuthCredential::new`] enforces the structural
/// check; a malformed value is rejected up front with
/// [`ConnectorError::InvalidCredential`] rather than at the first
/// network call.
#[derive(Clone)]
pub struct AuthCredential {
    value: SecretString,
}

impl AuthCredential {
    /// Validate and wrap a credential string.
    pub fn new(value: impl Into<String>) -> Result<Self, ConnectorError> {
        let value = value.into();
        if !is_valid_credential(&value) {
            return Err(ConnectorError::InvalidCredential);
        }
        Ok(Self {
            value: SecretString::from(value),
        })
    }

    /// Expose the credential for use in an `Authorization: Basic` header.
    ///
    /// Only call this at the point of use; never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredential")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// OAuth permission tier, selecting the account class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiScope {
    /// Personal account (`GIGACHAT_API_PERS`).
    #[default]
    Personal,
    /// Business account (`GIGACHAT_API_B2B`).
    Business,
    /// Corporate account (`GIGACHAT_API_CORP`).
    Corporate,
}

impl ApiScope {
    /// The scope parameter value sent to the token endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiScope::Personal => "GIGACHAT_API_PERS",
            ApiScope::Business => "GIGACHAT_API_B2B",
            ApiScope::Corporate => "GIGACHAT_API_CORP",
        }
    }
}

impl fmt::Display for ApiScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiScope {
    type Err = ConnectorError;

    /// Accepts the short form (`PERS`) and the full form (`GIGACHAT_API_PERS`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERS" | "GIGACHAT_API_PERS" => Ok(ApiScope::Personal),
            "B2B" | "GIGACHAT_API_B2B" => Ok(ApiScope::Business),
            "CORP" | "GIGACHAT_API_CORP" => Ok(ApiScope::Corporate),
            other => Err(ConnectorError::NotConfigured(format!(
                "unknown API scope '{other}': expected PERS, B2B or CORP"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_pair(id: &str, secret: &str) -> String {
        BASE64.encode(format!("{id}:{secret}"))
    }

    const UUID_A: &str = "0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9";
    const UUID_B: &str = "f9e8d7c6-b5a4-9382-7160-5f4e3d2c1b0a";

    #[test]
    fn test_valid_credential_roundtrip() {
        assert!(is_valid_credential(&encode_pair(UUID_A, UUID_B)));
    }

    #[test]
    fn test_uppercase_hex_is_accepted() {
        let upper = UUID_A.to_ascii_uppercase();
        assert!(is_valid_credential(&encode_pair(&upper, UUID_B)));
    }

    #[test]
    fn test_not_base64_is_invalid() {
        assert!(!is_valid_credential("not base64 at all!!!"));
    }

    #[test]
    fn test_missing_colon_is_invalid() {
        let no_colon = BASE64.encode(UUID_A);
        assert!(!is_valid_credential(&no_colon));
    }

    #[test]
    fn test_malformed_half_is_invalid() {
        assert!(!is_valid_credential(&encode_pair(UUID_A, "not-a-uuid")));
        assert!(!is_valid_credential(&encode_pair("short-id", UUID_B)));
    }

    #[test]
    fn test_non_utf8_payload_is_invalid() {
        let garbage = BASE64.encode([0xff, 0xfe, b':', 0xff]);
        assert!(!is_valid_credential(&garbage));
    }

    #[test]
    fn test_empty_string_is_invalid() {
        // Empty string decodes to empty bytes: no colon, so invalid.
        assert!(!is_valid_credential(""));
    }

    #[test]
    fn test_credential_redacted_in_debug() {
        let secret = encode_pair(UUID_A, UUID_B);
        let cred = AuthCredential::new(secret.clone()).unwrap();

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(&secret), "credential exposed in Debug!");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_credential_rejects_malformed_value() {
        let result = AuthCredential::new("garbage");
        assert!(matches!(result, Err(ConnectorError::InvalidCredential)));
    }

    #[test]
    fn test_credential_expose() {
        let secret = encode_pair(UUID_A, UUID_B);
        let cred = AuthCredential::new(secret.clone()).unwrap();
        assert_eq!(cred.expose(), secret);
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("PERS".parse::<ApiScope>().unwrap(), ApiScope::Personal);
        assert_eq!("b2b".parse::<ApiScope>().unwrap(), ApiScope::Business);
        assert_eq!(
            "GIGACHAT_API_CORP".parse::<ApiScope>().unwrap(),
            ApiScope::Corporate
        );
        assert!("GOLD".parse::<ApiScope>().is_err());
    }

    #[test]
    fn test_scope_wire_values() {
        assert_eq!(ApiScope::Personal.as_str(), "GIGACHAT_API_PERS");
        assert_eq!(ApiScope::Business.as_str(), "GIGACHAT_API_B2B");
        assert_eq!(ApiScope::Corporate.as_str(), "GIGACHAT_API_CORP");
    }

    proptest! {
        /// Any pair of UUID-shaped halves encodes to a valid credential.
        #[test]
        fn prop_uuid_shaped_pairs_are_valid(
            id in "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}",
            secret in "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}",
        ) {
            prop_assert!(is_valid_credential(&encode_pair(&id, &secret)));
        }

        /// The validator never panics, whatever the input.
        #[test]
        fn prop_validator_is_total(s in "\\PC*") {
            let _ = is_valid_credential(&s);
        }

        /// Base64 payloads without a colon are always rejected.
        #[test]
        fn prop_no_colon_never_valid(payload in "[a-z0-9-]{1,80}") {
            prop_assert!(!is_valid_credential(&BASE64.encode(&payload)));
        }
    }
}
