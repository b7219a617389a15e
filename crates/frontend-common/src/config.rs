//! Client configuration
//!
//! Settings are layered: built-in defaults, then an optional `avatarmart.toml`
//! (or an explicit file), then `AVATARMART_*` environment variables.

use avatarmart_core::TokenStore;
use avatarmart_http::{ClientError, MarketClient};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Build mode, which picks the default API location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// API reached through the dev server's `/api` proxy
    #[default]
    Development,
    Production,
}

impl Mode {
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:5173/api",
            Self::Production => "http://localhost:8000",
        }
    }
}

/// Client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: Mode,

    /// Explicit API base URL; overrides the mode default
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Where the session tokens are persisted
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl AppConfig {
    /// Prefix of the environment variables read by [`AppConfig::load`]
    pub const ENV_PREFIX: &'static str = "AVATARMART";

    /// Base name of the optional config file in the working directory
    pub const DEFAULT_FILE: &'static str = "avatarmart";

    /// Load configuration from an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any
    /// source cannot be parsed
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(Self::DEFAULT_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// API base URL: the explicit setting if present, else the mode default
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.mode.default_base_url())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Build an API client bound to the given token store
    pub fn client(&self, tokens: Arc<dyn TokenStore>) -> Result<MarketClient, ClientError> {
        let mut builder = MarketClient::builder()
            .base_url(self.base_url())
            .token_store(tokens);
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
