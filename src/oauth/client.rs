//! Client registration details and provider endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::scope::ScopeSet;
use crate::error::{AuthError, Result};

/// Default origin for the consent and token endpoints.
pub const DEFAULT_AUTHORIZE_BASE: &str = "https://www.reddit.com";

/// Default origin for authenticated API calls.
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

const AUTHORIZE_PATH: &str = "api/v1/authorize";
const ACCESS_TOKEN_PATH: &str = "api/v1/access_token";

/// Lifetime class requested for the grant.
///
/// Only `Permanent` grants come with a refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantDuration {
    #[default]
    Temporary,
    Permanent,
}

impl GrantDuration {
    pub fn as_str(self) -> &'static str {
        match self {
            GrantDuration::Temporary => "temporary",
            GrantDuration::Permanent => "permanent",
        }
    }
}

impl fmt::Display for GrantDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "temporary" => Ok(GrantDuration::Temporary),
            "permanent" => Ok(GrantDuration::Permanent),
            _ => Err(format!("Unknown grant duration: {s}")),
        }
    }
}

/// Provider origins. Paths below them are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Origin hosting `/api/v1/authorize` and `/api/v1/access_token`.
    pub authorize_base: Url,
    /// Origin for bearer-authenticated API calls.
    pub api_base: Url,
}

impl Endpoints {
    pub fn new(authorize_base: &str, api_base: &str) -> Result<Self> {
        Ok(Self {
            authorize_base: parse_origin(authorize_base)?,
            api_base: parse_origin(api_base)?,
        })
    }

    /// Point every endpoint at a single origin (stub servers, proxies).
    pub fn single_origin(origin: &str) -> Result<Self> {
        Self::new(origin, origin)
    }

    pub fn authorize_url(&self) -> Result<Url> {
        join_path(&self.authorize_base, AUTHORIZE_PATH)
    }

    pub fn token_url(&self) -> Result<Url> {
        join_path(&self.authorize_base, ACCESS_TOKEN_PATH)
    }

    /// Resolve an API path (e.g. `/api/v1/me`) against the API origin.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        join_path(&self.api_base, path)
    }
}

impl Default for Endpoints {
    // Both constants are valid absolute URLs.
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        Self {
            authorize_base: Url::parse(DEFAULT_AUTHORIZE_BASE).unwrap(),
            api_base: Url::parse(DEFAULT_API_BASE).unwrap(),
        }
    }
}

fn parse_origin(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AuthError::InvalidConfig(format!("Invalid endpoint URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AuthError::InvalidConfig(format!(
            "Endpoint URL {raw:?} cannot be used as a base"
        )));
    }
    Ok(url)
}

fn join_path(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|e| AuthError::InvalidConfig(format!("Invalid endpoint path {path:?}: {e}")))
}

/// Everything the authorization flow needs to know about the registered app.
#[derive(Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub duration: GrantDuration,
    pub scopes: ScopeSet,
    pub endpoints: Endpoints,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            duration: GrantDuration::default(),
            scopes: ScopeSet::new(),
            endpoints: Endpoints::default(),
            user_agent: default_user_agent(),
        }
    }

    pub fn with_duration(mut self, duration: GrantDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = super::Scope>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the HTTP client used for token exchanges and API calls.
    ///
    /// No request timeout is configured; callers that need bounded waits
    /// wrap the futures themselves.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(AuthError::Transport)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("duration", &self.duration)
            .field("scopes", &self.scopes)
            .field("endpoints", &self.endpoints)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

pub fn default_user_agent() -> String {
    format!("reddit-oauth/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Scope;

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.authorize_url().unwrap().as_str(),
            "https://www.reddit.com/api/v1/authorize"
        );
        assert_eq!(
            endpoints.token_url().unwrap().as_str(),
            "https://www.reddit.com/api/v1/access_token"
        );
        assert_eq!(
            endpoints.api_url("/api/v1/me").unwrap().as_str(),
            "https://oauth.reddit.com/api/v1/me"
        );
    }

    #[test]
    fn test_single_origin_with_port() {
        let endpoints = Endpoints::single_origin("http://127.0.0.1:4567").unwrap();
        assert_eq!(
            endpoints.token_url().unwrap().as_str(),
            "http://127.0.0.1:4567/api/v1/access_token"
        );
        assert_eq!(
            endpoints.api_url("api/v1/me").unwrap().as_str(),
            "http://127.0.0.1:4567/api/v1/me"
        );
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let err = Endpoints::new("not a url", DEFAULT_API_BASE).unwrap_err();
        assert!(matches!(err, AuthError::InvalidConfig(_)));
    }

    #[test]
    fn test_duration_parse_and_display() {
        assert_eq!("permanent".parse::<GrantDuration>().unwrap(), GrantDuration::Permanent);
        assert_eq!("Temporary".parse::<GrantDuration>().unwrap(), GrantDuration::Temporary);
        assert!("forever".parse::<GrantDuration>().is_err());
        assert_eq!(GrantDuration::Permanent.to_string(), "permanent");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ClientConfig::new("id", "super-secret", "http://localhost:8080/cb")
            .with_scopes([Scope::Read]);
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::new("id", "secret", "http://localhost:8080/cb")
            .with_duration(GrantDuration::Permanent)
            .with_scopes([Scope::Read, Scope::Read, Scope::History]);
        assert_eq!(config.duration, GrantDuration::Permanent);
        assert_eq!(config.scopes.len(), 2);
        assert!(config.user_agent.starts_with("reddit-oauth/"));
    }
}
