//! OAuth2 authorization-code client for the Reddit API.
//!
//! See [`oauth`] for the authorization lifecycle and [`models`] for the
//! resource shapes authenticated calls decode into.

pub mod config;
pub mod error;
pub mod models;
pub mod oauth;

pub use error::{AuthError, Result};
pub use oauth::{AuthorizationFlow, ClientConfig, CodeProvider, CredentialSession};
