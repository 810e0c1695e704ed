//! End-to-end authorization attempt.
//!
//! state → consent URL → code → exchange → [`CredentialSession`]. Any step
//! failing aborts the attempt; no partially initialised session escapes.

use std::future::Future;

use tracing::{info, instrument, warn};
use url::Url;

use super::authorize_url::build_authorization_url;
use super::client::ClientConfig;
use super::code_provider::CodeProvider;
use super::exchange::Exchanger;
use super::session::CredentialSession;
use super::state::StateToken;
use crate::error::{AuthError, Result};

/// One configured way of running authorization attempts.
#[derive(Debug)]
pub struct AuthorizationFlow {
    config: ClientConfig,
    provider: CodeProvider,
    exchanger: Exchanger,
}

impl AuthorizationFlow {
    /// Build a flow with an HTTP client derived from `config`.
    pub fn new(config: ClientConfig, provider: CodeProvider) -> Result<Self> {
        let http_client = config.http_client()?;
        Self::with_http_client(config, provider, http_client)
    }

    pub fn with_http_client(
        config: ClientConfig,
        provider: CodeProvider,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let exchanger = Exchanger::new(http_client, &config.endpoints)?;
        Ok(Self {
            config,
            provider,
            exchanger,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run an attempt with a freshly generated state token.
    ///
    /// `present` receives the consent URL and must get it in front of the
    /// user; the flow waits for it before waiting for the code.
    pub async fn run<F, Fut>(&self, present: F) -> Result<CredentialSession>
    where
        F: FnOnce(Url) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.run_with_state(StateToken::generate(), present).await
    }

    /// Run an attempt with a caller-supplied state token.
    #[instrument(skip_all, fields(client_id = %self.config.client_id))]
    pub async fn run_with_state<F, Fut>(&self, state: StateToken, present: F) -> Result<CredentialSession>
    where
        F: FnOnce(Url) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let url = build_authorization_url(&self.config, state.as_str())?;

        let pending = self.provider.begin().await?;
        present(url).await?;

        let Some(code) = pending.finish(&state).await? else {
            warn!("No authorization code was obtained");
            return Err(AuthError::denied("no authorization code in redirect"));
        };

        let result = self
            .exchanger
            .exchange_code(
                &self.config.client_id,
                &self.config.client_secret,
                &code,
                &self.config.redirect_uri,
            )
            .await?;

        let session = CredentialSession::new(self.exchanger.clone(), result);
        info!(
            expires_at = %session.expires_at(),
            has_refresh_token = session.refresh_token().is_some(),
            "Authorization complete"
        );
        Ok(session)
    }
}

/// One-shot convenience over [`AuthorizationFlow`].
pub async fn authorize<F, Fut>(
    config: ClientConfig,
    provider: CodeProvider,
    present: F,
) -> Result<CredentialSession>
where
    F: FnOnce(Url) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    AuthorizationFlow::new(config, provider)?.run(present).await
}
