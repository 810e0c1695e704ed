//! Token acquisition against the provider's access-token endpoint.
//!
//! Two grants, both POSTed form-encoded to `/api/v1/access_token`:
//! - `authorization_code`, authenticated with HTTP Basic (`client_id:client_secret`)
//! - `refresh_token`, authenticated with the still-current bearer access token
//!
//! No retries happen here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, instrument};
use url::Url;

use super::client::Endpoints;
use super::token::AuthorizationResult;
use crate::error::Result;

/// Performs the two token-endpoint exchanges.
#[derive(Debug, Clone)]
pub struct Exchanger {
    http_client: reqwest::Client,
    token_url: Url,
}

impl Exchanger {
    pub fn new(http_client: reqwest::Client, endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            http_client,
            token_url: endpoints.token_url()?,
        })
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Exchange an authorization code for a token pair.
    #[instrument(skip_all, fields(token_url = %self.token_url))]
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizationResult> {
        debug!("Exchanging authorization code");

        let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .header(AUTHORIZATION, format!("Basic {credentials}"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let result = AuthorizationResult::decode(status, &body)?;

        debug!(
            expires_in_secs = result.expires_in().as_secs(),
            has_refresh_token = result.refresh_token().is_some(),
            "Authorization code exchanged"
        );
        Ok(result)
    }

    /// Obtain a new access token with a refresh token.
    ///
    /// The response normally carries no `refresh_token`; callers keep the one
    /// they already hold unless a new one is returned.
    #[instrument(skip_all, fields(token_url = %self.token_url))]
    pub async fn refresh(&self, access_token: &str, refresh_token: &str) -> Result<AuthorizationResult> {
        debug!("Refreshing access token");

        let params = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .header(AUTHORIZATION, format!("bearer {access_token}"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let result = AuthorizationResult::decode(status, &body)?;

        debug!(
            expires_in_secs = result.expires_in().as_secs(),
            rotated_refresh_token = result.refresh_token().is_some(),
            "Access token refreshed"
        );
        Ok(result)
    }
}
