//! Token endpoint response codec.
//!
//! Turns the raw token-endpoint answer into an [`AuthorizationResult`]. The
//! codec knows nothing about how the authorization code was obtained or
//! which grant produced the response.
//!
//! # Wire format
//!
//! ```text
//! {"access_token": "...", "token_type": "bearer", "expires_in": 3600,
//!  "scope": "read history", "refresh_token": "..."}
//! ```
//!
//! `refresh_token` is only present for permanent grants, and normally absent
//! from refresh responses.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use super::scope::{ScopeSet, parse_scopes};
use crate::error::{AuthError, Result};

/// Raw token endpoint response, exactly as sent by the provider.
#[derive(Debug, Deserialize)]
struct RawAuthorization {
    access_token: String,
    token_type: String,
    expires_in: u64,
    scope: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Outcome of a successful code exchange or refresh.
///
/// Immutable: a refresh yields a new value rather than editing an old one.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationResult {
    access_token: String,
    expires_in: Duration,
    refresh_token: Option<String>,
    granted_scopes: ScopeSet,
}

impl AuthorizationResult {
    pub fn new(
        access_token: impl Into<String>,
        expires_in: Duration,
        refresh_token: Option<String>,
        granted_scopes: ScopeSet,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in,
            refresh_token,
            granted_scopes,
        }
    }

    /// Decode a token endpoint response.
    ///
    /// Non-success statuses, non-JSON bodies and bodies missing required
    /// fields all become [`AuthError::ExchangeFailed`] carrying the status
    /// and the raw body.
    pub fn decode(status: StatusCode, body: &str) -> Result<Self> {
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token endpoint returned an error status");
            return Err(AuthError::ExchangeFailed {
                status,
                body: body.to_string(),
            });
        }

        let raw: RawAuthorization = serde_json::from_str(body).map_err(|e| {
            warn!(status = status.as_u16(), error = %e, "Token endpoint body did not decode");
            AuthError::ExchangeFailed {
                status,
                body: body.to_string(),
            }
        })?;

        if !raw.token_type.eq_ignore_ascii_case("bearer") {
            warn!(token_type = %raw.token_type, "Token endpoint issued a non-bearer token");
            return Err(AuthError::ExchangeFailed {
                status,
                body: body.to_string(),
            });
        }

        if raw.access_token.is_empty() {
            return Err(AuthError::ExchangeFailed {
                status,
                body: body.to_string(),
            });
        }

        Ok(Self {
            access_token: raw.access_token,
            expires_in: Duration::from_secs(raw.expires_in),
            refresh_token: raw.refresh_token.filter(|t| !t.is_empty()),
            granted_scopes: parse_scopes(&raw.scope),
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Lifetime at the moment of issuance.
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn granted_scopes(&self) -> &ScopeSet {
        &self.granted_scopes
    }
}

impl std::fmt::Debug for AuthorizationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationResult")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("granted_scopes", &self.granted_scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Scope;

    #[test]
    fn test_decode_minimal_response() {
        let body = r#"{"access_token":"AT1","token_type":"bearer","expires_in":3600,"scope":"read"}"#;
        let result = AuthorizationResult::decode(StatusCode::OK, body).unwrap();
        assert_eq!(result.access_token(), "AT1");
        assert_eq!(result.expires_in(), Duration::from_secs(3600));
        assert!(result.refresh_token().is_none());
        assert_eq!(result.granted_scopes(), &ScopeSet::from([Scope::Read]));
    }

    #[test]
    fn test_decode_with_refresh_token() {
        let body = r#"{"access_token":"AT","token_type":"bearer","expires_in":86400,"scope":"identity  history\tread","refresh_token":"RT"}"#;
        let result = AuthorizationResult::decode(StatusCode::OK, body).unwrap();
        assert_eq!(result.refresh_token(), Some("RT"));
        assert_eq!(
            result.granted_scopes(),
            &ScopeSet::from([Scope::Identity, Scope::History, Scope::Read])
        );
    }

    #[test]
    fn test_error_status_keeps_body() {
        let err = AuthorizationResult::decode(StatusCode::UNAUTHORIZED, r#"{"message": "Unauthorized", "error": 401}"#)
            .unwrap_err();
        match err {
            AuthError::ExchangeFailed { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body() {
        let err = AuthorizationResult::decode(StatusCode::OK, "<html>busy</html>").unwrap_err();
        assert!(matches!(err, AuthError::ExchangeFailed { status, ref body } if status == StatusCode::OK && body == "<html>busy</html>"));
    }

    #[test]
    fn test_error_payload_with_success_status() {
        // The provider reports some grant errors with a 200 status.
        let err = AuthorizationResult::decode(StatusCode::OK, r#"{"error": "invalid_grant"}"#).unwrap_err();
        assert_eq!(err.kind(), "exchange_failed");
    }

    #[test]
    fn test_non_bearer_token_type_rejected() {
        let body = r#"{"access_token":"AT","token_type":"mac","expires_in":60,"scope":"read"}"#;
        let err = AuthorizationResult::decode(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, AuthError::ExchangeFailed { status, ref body } if status == StatusCode::OK && body.contains("mac")));

        let body = r#"{"access_token":"AT","token_type":"Bearer","expires_in":60,"scope":"read"}"#;
        assert!(AuthorizationResult::decode(StatusCode::OK, body).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let body = r#"{"access_token":"AT","token_type":"bearer","scope":"read"}"#;
        assert!(AuthorizationResult::decode(StatusCode::OK, body).is_err());
    }

    #[test]
    fn test_empty_refresh_token_treated_as_absent() {
        let body = r#"{"access_token":"AT","token_type":"bearer","expires_in":60,"scope":"read","refresh_token":""}"#;
        let result = AuthorizationResult::decode(StatusCode::OK, body).unwrap();
        assert!(result.refresh_token().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let result = AuthorizationResult::new("secret-token", Duration::from_secs(1), None, ScopeSet::new());
        assert!(!format!("{result:?}").contains("secret-token"));
    }
}
