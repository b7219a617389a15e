//! CLI configuration utilities

use anyhow::{Context, Result};
use avatarmart_core::{FileTokenStore, TokenStore};
use avatarmart_frontend::{AppConfig, AuthSession};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Load client settings from an optional file and the environment
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let config = AppConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to read configuration from {}", path.display()),
        None => "Failed to read configuration".to_string(),
    })?;
    debug!(base_url = config.base_url(), mode = ?config.mode, "Loaded configuration");
    Ok(config)
}

/// Token file location: the configured path, else the per-user data dir
pub fn token_file(config: &AppConfig) -> Result<PathBuf> {
    config
        .token_file
        .clone()
        .or_else(FileTokenStore::default_path)
        .context("Could not determine a token file location; set token_file in avatarmart.toml")
}

/// Open a session backed by the on-disk token file
pub fn open_session(config: &AppConfig) -> Result<AuthSession> {
    let path = token_file(config)?;
    debug!(path = %path.display(), "Using token file");
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(path));
    let client = config.client(tokens).context("Failed to build API client")?;
    Ok(AuthSession::new(client))
}
