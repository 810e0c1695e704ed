//! Credential session with lazy, on-use token refresh.
//!
//! A session is either [`SessionState::Valid`] (now < expiry) or
//! [`SessionState::Expired`]. There is no background timer: every
//! authenticated call checks the state first and, if expired, refreshes
//! synchronously before proceeding.
//!
//! # Ownership
//!
//! Mutating operations take `&mut self`, so a session has one owner and
//! refreshes are sequential. Callers sharing a session across tasks must
//! wrap it themselves (e.g. `tokio::sync::Mutex`); this module does not
//! deduplicate concurrent refreshes.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::IntoUrl;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::exchange::Exchanger;
use super::scope::ScopeSet;
use super::token::AuthorizationResult;
use crate::error::{AuthError, Result};

/// Freshness of the held access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Valid,
    Expired,
}

/// The token, its expiry and the refresh token, always replaced together.
#[derive(Clone, PartialEq, Eq)]
struct Credentials {
    access_token: String,
    expires_at: DateTime<Utc>,
    refresh_token: Option<String>,
    granted_scopes: ScopeSet,
}

impl Credentials {
    fn issued(result: AuthorizationResult, issued_at: DateTime<Utc>) -> Self {
        Self::refreshed(result, None, issued_at)
    }

    /// Credentials from a refresh response, carrying `previous_refresh`
    /// forward unless the response rotated it.
    fn refreshed(
        result: AuthorizationResult,
        previous_refresh: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = expiry_from(issued_at, result.expires_in());
        let refresh_token = result.refresh_token().map(str::to_string).or(previous_refresh);
        Self {
            access_token: result.access_token().to_string(),
            expires_at,
            refresh_token,
            granted_scopes: result.granted_scopes().clone(),
        }
    }
}

/// Absolute expiry for a lifetime measured from `issued_at`.
fn expiry_from(issued_at: DateTime<Utc>, lifetime: Duration) -> DateTime<Utc> {
    let secs = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
    TimeDelta::try_seconds(secs)
        .and_then(|delta| issued_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Holds the current credentials and performs authenticated calls.
pub struct CredentialSession {
    exchanger: Exchanger,
    credentials: Credentials,
}

impl CredentialSession {
    /// Seed a session from an exchange result; expiry is measured from now.
    pub fn new(exchanger: Exchanger, result: AuthorizationResult) -> Self {
        Self {
            exchanger,
            credentials: Credentials::issued(result, Utc::now()),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.credentials.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.credentials.expires_at
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials.refresh_token.as_deref()
    }

    /// Scopes reported by the provider. Informational only.
    pub fn granted_scopes(&self) -> &ScopeSet {
        &self.credentials.granted_scopes
    }

    pub fn state(&self) -> SessionState {
        self.state_at(Utc::now())
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if now < self.credentials.expires_at {
            SessionState::Valid
        } else {
            SessionState::Expired
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state() == SessionState::Expired
    }

    /// Time left before the access token expires; zero once expired.
    pub fn time_until_expiry(&self) -> Duration {
        (self.credentials.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Exchange the refresh token for a new access token now.
    ///
    /// On success the token, expiry and refresh token are swapped in one
    /// assignment. On failure the session is left untouched.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(refresh_token) = self.credentials.refresh_token.clone() else {
            warn!("Access token expired and session holds no refresh token");
            return Err(AuthError::SessionExpiredNoRefresh);
        };

        let result = self
            .exchanger
            .refresh(&self.credentials.access_token, &refresh_token)
            .await?;

        self.credentials = Credentials::refreshed(result, Some(refresh_token), Utc::now());
        info!(expires_at = %self.credentials.expires_at, "Session refreshed");
        Ok(())
    }

    /// Make sure the access token is usable, refreshing if it has expired.
    pub async fn ensure_fresh(&mut self) -> Result<&str> {
        if self.state() == SessionState::Expired {
            debug!(expired_at = %self.credentials.expires_at, "Access token expired, refreshing");
            self.refresh().await?;
        }
        Ok(&self.credentials.access_token)
    }

    /// GET `url` with the bearer token and decode the JSON body.
    ///
    /// Refreshes first if the token has expired. Transport failures,
    /// non-success statuses and undecodable bodies are returned as-is.
    #[instrument(skip(self, url))]
    pub async fn get<T: DeserializeOwned>(&mut self, url: impl IntoUrl) -> Result<T> {
        let access_token = self.ensure_fresh().await?.to_string();

        let response = self
            .exchanger
            .http_client()
            .get(url)
            .header(AUTHORIZATION, format!("bearer {access_token}"))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Authenticated request failed");
            return Err(AuthError::Api {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl std::fmt::Debug for CredentialSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSession")
            .field("expires_at", &self.credentials.expires_at)
            .field("has_refresh_token", &self.credentials.refresh_token.is_some())
            .field("granted_scopes", &self.credentials.granted_scopes)
            .finish_non_exhaustive()
    }
}
