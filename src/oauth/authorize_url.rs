//! Consent URL construction.
//!
//! Pure: no network, no clock. The same inputs always produce the same URL;
//! only the caller-supplied state varies between attempts.

use url::Url;

use super::client::ClientConfig;
use super::scope::join_scopes;
use crate::error::{AuthError, Result};

/// Build the user-facing consent URL for an authorization attempt.
///
/// Query parameters are emitted in a fixed order and percent-encoded;
/// scopes are space-joined before encoding.
pub fn build_authorization_url(config: &ClientConfig, state: &str) -> Result<Url> {
    if config.client_id.trim().is_empty() {
        return Err(AuthError::InvalidConfig("client_id must not be empty".into()));
    }
    if config.redirect_uri.trim().is_empty() {
        return Err(AuthError::InvalidConfig("redirect_uri must not be empty".into()));
    }
    if config.scopes.is_empty() {
        return Err(AuthError::InvalidConfig(
            "at least one scope must be requested".into(),
        ));
    }

    let base = config.endpoints.authorize_url()?;
    let scope = join_scopes(&config.scopes);
    let raw = format!(
        "{}?client_id={}&response_type=code&state={}&redirect_uri={}&duration={}&scope={}",
        base,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(state),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(config.duration.as_str()),
        urlencoding::encode(&scope),
    );

    Url::parse(&raw).map_err(|e| AuthError::InvalidConfig(format!("Invalid authorization URL: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::client::GrantDuration;
    use crate::oauth::scope::{Scope, ScopeSet, parse_scopes};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn config() -> ClientConfig {
        ClientConfig::new("my-client", "secret", "http://localhost:8080/callback")
            .with_duration(GrantDuration::Permanent)
            .with_scopes([Scope::Read, Scope::History])
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_contains_required_parameters() {
        let url = build_authorization_url(&config(), "state-123").unwrap();
        assert_eq!(url.host_str(), Some("www.reddit.com"));
        assert_eq!(url.path(), "/api/v1/authorize");

        let params = query(&url);
        assert_eq!(params["client_id"], "my-client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "state-123");
        assert_eq!(params["redirect_uri"], "http://localhost:8080/callback");
        assert_eq!(params["duration"], "permanent");
        assert_eq!(params["scope"], "history read");
    }

    #[test]
    fn test_percent_encodes_values() {
        let url = build_authorization_url(&config(), "a b&c").unwrap();
        let raw = url.as_str();
        assert!(raw.contains("state=a%20b%26c"));
        assert!(raw.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"));
        assert!(raw.contains("scope=history%20read"));
    }

    #[test]
    fn test_deterministic_except_state() {
        let a = build_authorization_url(&config(), "one").unwrap();
        let b = build_authorization_url(&config(), "one").unwrap();
        let c = build_authorization_url(&config(), "two").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut qa = query(&a);
        let mut qc = query(&c);
        qa.remove("state");
        qc.remove("state");
        assert_eq!(qa, qc);
    }

    #[test]
    fn test_empty_scopes_rejected() {
        let mut cfg = config();
        cfg.scopes.clear();
        let err = build_authorization_url(&cfg, "s").unwrap_err();
        assert!(matches!(err, AuthError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let mut cfg = config();
        cfg.client_id = "  ".into();
        assert!(build_authorization_url(&cfg, "s").is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trips_scopes_and_duration(
            picks in proptest::collection::btree_set(0..Scope::ALL.len(), 1..10),
            permanent in any::<bool>(),
            state in "[A-Za-z0-9 ._~&=-]{1,24}",
        ) {
            let scopes: ScopeSet = picks.iter().map(|i| Scope::ALL[*i]).collect();
            let duration = if permanent { GrantDuration::Permanent } else { GrantDuration::Temporary };
            let mut cfg = config().with_duration(duration);
            cfg.scopes = scopes.clone();

            let url = build_authorization_url(&cfg, &state).unwrap();
            let params = query(&url);

            prop_assert_eq!(parse_scopes(&params["scope"]), scopes);
            prop_assert_eq!(params["duration"].parse::<GrantDuration>().unwrap(), duration);
            prop_assert_eq!(&params["state"], &state);
        }
    }
}
