//! OAuth 2.0 authorization-code client for the Reddit API.
//!
//! # Architecture
//!
//! - [`build_authorization_url`] - consent URL for a client config and state
//! - [`CodeProvider`] - how the code comes back: embedded [`CallbackListener`]
//!   or a caller-supplied [`CodeResolver`]
//! - [`Exchanger`] - `authorization_code` and `refresh_token` grants
//! - [`AuthorizationResult`] - decoded token-endpoint response
//! - [`CredentialSession`] - current credentials, refreshed lazily on use
//! - [`AuthorizationFlow`] - runs all of the above as one attempt
//!
//! # Example
//!
//! ```rust,ignore
//! use reddit_oauth::oauth::{AuthorizationFlow, ClientConfig, CodeProvider, Scope};
//!
//! let config = ClientConfig::new("client-id", "secret", "http://localhost:8080/callback")
//!     .with_scopes([Scope::Identity, Scope::Read]);
//! let flow = AuthorizationFlow::new(config, CodeProvider::listener(8080))?;
//! let mut session = flow
//!     .run(|url| async move {
//!         println!("Open {url}");
//!         Ok(())
//!     })
//!     .await?;
//! let me: serde_json::Value = session.get("https://oauth.reddit.com/api/v1/me").await?;
//! ```

pub mod authorize_url;
pub mod callback;
pub mod client;
pub mod code_provider;
pub mod exchange;
pub mod flow;
pub mod scope;
pub mod session;
pub mod state;
pub mod token;

// Re-exports
pub use authorize_url::build_authorization_url;
pub use callback::{
    BoundCallbackListener, CallbackListener, CallbackRequest, CallbackResponder, CallbackResponse,
    HtmlResponder, StatusResponder, error_html, success_html,
};
pub use client::{ClientConfig, Endpoints, GrantDuration};
pub use code_provider::{CodeProvider, CodeResolver, PendingCode};
pub use exchange::Exchanger;
pub use flow::{AuthorizationFlow, authorize};
pub use scope::{Scope, ScopeSet, parse_scopes};
pub use session::{CredentialSession, SessionState};
pub use state::StateToken;
pub use token::AuthorizationResult;
