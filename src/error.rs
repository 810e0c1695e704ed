use reqwest::StatusCode;

/// Convenience alias used throughout the crate.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Errors produced by the authorization lifecycle and authenticated calls.
///
/// Nothing is retried or recovered internally; every failure reaches the
/// caller with enough context (status, raw body, condition name) to be
/// diagnosed locally.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The redirect or the resolver yielded no authorization code.
    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    /// The token endpoint answered with a non-success status or a body that
    /// is not a complete token response.
    #[error("Token exchange failed ({status}): {body}")]
    ExchangeFailed { status: StatusCode, body: String },

    /// An authenticated call was attempted after expiry without a refresh token.
    #[error("Access token expired and no refresh token is available")]
    SessionExpiredNoRefresh,

    /// The underlying network call failed (DNS, connect, reset, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An authenticated API call returned a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    /// An authenticated API call returned a body that did not decode.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The embedded callback listener could not bind, accept or read.
    #[error("Callback listener error: {0}")]
    Listener(#[from] std::io::Error),

    /// Client configuration or URL builder input was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AuthError {
    /// Shorthand for [`AuthError::AuthorizationDenied`].
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            reason: reason.into(),
        }
    }

    /// Stable condition name, suitable for log fields and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthorizationDenied { .. } => "authorization_denied",
            Self::ExchangeFailed { .. } => "exchange_failed",
            Self::SessionExpiredNoRefresh => "session_expired_no_refresh",
            Self::Transport(_) => "transport_failure",
            Self::Api { .. } => "api_error",
            Self::Decode(_) => "decode_error",
            Self::Listener(_) => "listener_error",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// HTTP status attached to the error, if the failure came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ExchangeFailed { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_failed_carries_status_and_body() {
        let err = AuthError::ExchangeFailed {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"error": 401}"#.to_string(),
        };
        assert_eq!(err.kind(), "exchange_failed");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains(r#"{"error": 401}"#));
    }

    #[test]
    fn test_denied_helper() {
        let err = AuthError::denied("access_denied");
        assert!(matches!(err, AuthError::AuthorizationDenied { ref reason } if reason == "access_denied"));
        assert_eq!(err.kind(), "authorization_denied");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_expired_no_refresh_kind() {
        assert_eq!(
            AuthError::SessionExpiredNoRefresh.kind(),
            "session_expired_no_refresh"
        );
    }
}
