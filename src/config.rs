use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use url::Url;

use crate::error::Result;
use crate::oauth::client::{
    ClientConfig, DEFAULT_API_BASE, DEFAULT_AUTHORIZE_BASE, Endpoints, GrantDuration,
    default_user_agent,
};
use crate::oauth::{Scope, parse_scopes};

// ---------------------------------------------------------------------------
// Environment override tracking
// ---------------------------------------------------------------------------

/// Tracks which configuration settings are overridden by environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    overrides: HashMap<String, String>,
}

impl EnvOverrides {
    /// Check whether a setting key (e.g. "oauth.client_id") is overridden by an env var.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.overrides.contains_key(key)
    }

    /// Get the env var name that overrides the given setting key.
    pub fn env_var_for(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).map(String::as_str)
    }

    /// Get all overrides as a map of setting key -> env var name.
    pub fn all(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    fn record(&mut self, key: &str, env_var: &str) {
        self.overrides.insert(key.to_string(), env_var.to_string());
    }
}

// ---------------------------------------------------------------------------
// Main configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Env var overrides are not serialized to TOML.
    #[serde(skip)]
    pub env_overrides: EnvOverrides,
}

/// Application registration and provider endpoints.
#[derive(Clone, Deserialize, Serialize)]
pub struct OAuthSettings {
    #[serde(default)]
    pub client_id: String,
    /// Empty for installed apps, which have no secret.
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default)]
    pub duration: GrantDuration,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<Scope>,
    /// When set, the embedded redirect listener runs on this port.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_port: Option<u16>,
    #[serde(default = "default_authorize_base")]
    pub authorize_base: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            duration: GrantDuration::default(),
            scopes: default_scopes(),
            callback_port: None,
            authorize_base: default_authorize_base(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
        }
    }
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("duration", &self.duration)
            .field("scopes", &self.scopes)
            .field("callback_port", &self.callback_port)
            .field("authorize_base", &self.authorize_base)
            .field("api_base", &self.api_base)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl OAuthSettings {
    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(&self.authorize_base, &self.api_base)
    }

    /// The client configuration the authorization flow runs with.
    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(
            ClientConfig::new(&self.client_id, &self.client_secret, &self.redirect_uri)
                .with_duration(self.duration)
                .with_scopes(self.scopes.iter().copied())
                .with_endpoints(self.endpoints()?)
                .with_user_agent(&self.user_agent),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_redirect_uri() -> String {
    "http://localhost:8080/callback".to_string()
}
fn default_scopes() -> Vec<Scope> {
    vec![Scope::Identity]
}
fn default_authorize_base() -> String {
    DEFAULT_AUTHORIZE_BASE.to_string()
}
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a TOML file, then apply env var overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings the authorization flow cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let oauth = &self.oauth;
        anyhow::ensure!(!oauth.client_id.trim().is_empty(), "oauth.client_id must be set");
        anyhow::ensure!(!oauth.scopes.is_empty(), "oauth.scopes must not be empty");
        anyhow::ensure!(!oauth.user_agent.trim().is_empty(), "oauth.user_agent must not be empty");

        let redirect = Url::parse(&oauth.redirect_uri)
            .map_err(|e| anyhow::anyhow!("oauth.redirect_uri is not a valid URL: {e}"))?;
        if oauth.callback_port.is_some() && redirect.port_or_known_default() != oauth.callback_port {
            tracing::warn!(
                redirect_uri = %oauth.redirect_uri,
                callback_port = ?oauth.callback_port,
                "Redirect URI port differs from the callback listener port"
            );
        }

        oauth.endpoints()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        let mut ov = EnvOverrides::default();

        // -- Helpers (macros for concise per-field overrides) --

        macro_rules! env_str {
            ($key:expr, $env:expr, $field:expr) => {
                if let Ok(val) = std::env::var($env) {
                    $field = val;
                    ov.record($key, $env);
                }
            };
        }
        macro_rules! env_bool {
            ($key:expr, $env:expr, $field:expr) => {
                if let Ok(val) = std::env::var($env) {
                    $field = matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
                    ov.record($key, $env);
                }
            };
        }
        macro_rules! env_parse {
            ($key:expr, $env:expr, $field:expr) => {
                if let Ok(val) = std::env::var($env) {
                    if let Ok(parsed) = val.parse() {
                        $field = parsed;
                        ov.record($key, $env);
                    }
                }
            };
        }
        macro_rules! env_opt_parse {
            ($key:expr, $env:expr, $field:expr) => {
                if let Ok(val) = std::env::var($env) {
                    if val.is_empty() {
                        $field = None;
                        ov.record($key, $env);
                    } else if let Ok(parsed) = val.parse() {
                        $field = Some(parsed);
                        ov.record($key, $env);
                    }
                }
            };
        }

        // -- OAuth --
        env_str!("oauth.client_id", "REDDIT_OAUTH_CLIENT_ID", self.oauth.client_id);
        env_str!("oauth.client_secret", "REDDIT_OAUTH_CLIENT_SECRET", self.oauth.client_secret);
        env_str!("oauth.redirect_uri", "REDDIT_OAUTH_REDIRECT_URI", self.oauth.redirect_uri);
        env_parse!("oauth.duration", "REDDIT_OAUTH_DURATION", self.oauth.duration);
        if let Ok(val) = std::env::var("REDDIT_OAUTH_SCOPES") {
            self.oauth.scopes = parse_scopes(&val.replace(',', " ")).into_iter().collect();
            ov.record("oauth.scopes", "REDDIT_OAUTH_SCOPES");
        }
        env_opt_parse!("oauth.callback_port", "REDDIT_OAUTH_CALLBACK_PORT", self.oauth.callback_port);
        env_str!("oauth.authorize_base", "REDDIT_OAUTH_AUTHORIZE_BASE", self.oauth.authorize_base);
        env_str!("oauth.api_base", "REDDIT_OAUTH_API_BASE", self.oauth.api_base);
        env_str!("oauth.user_agent", "REDDIT_OAUTH_USER_AGENT", self.oauth.user_agent);

        // -- Logging --
        env_str!("logging.level", "REDDIT_OAUTH_LOG_LEVEL", self.logging.level);
        env_bool!("logging.json", "REDDIT_OAUTH_LOG_JSON", self.logging.json);

        self.env_overrides = ov;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
