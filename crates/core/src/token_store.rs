//! Persisted access/refresh token pair
//!
//! The store is the single source of truth for credentials: the HTTP client
//! reads it before every request. Nothing here tracks expiry; the server's 401
//! decides whether a token is still good.

use crate::error::StoreResult;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Token pair as persisted under [`ACCESS_TOKEN_KEY`] and [`REFRESH_TOKEN_KEY`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Durable storage for the session's credentials
pub trait TokenStore: Send + Sync {
    /// Current access token, if any
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if any
    fn refresh_token(&self) -> Option<String>;

    /// Replace both tokens, e.g. after login
    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> StoreResult<()>;

    /// Replace only the access token, keeping the refresh token
    fn set_access_token(&self, access_token: &str) -> StoreResult<()>;

    /// Forget both tokens
    fn clear(&self) -> StoreResult<()>;
}

/// In-process token store. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: ArcSwap<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given tokens
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            tokens: ArcSwap::from_pointee(StoredTokens {
                access_token: access_token.map(str::to_string),
                refresh_token: refresh_token.map(str::to_string),
            }),
        }
    }

    /// Snapshot of both tokens
    pub fn snapshot(&self) -> StoredTokens {
        self.tokens.load().as_ref().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.load().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.load().refresh_token.clone()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> StoreResult<()> {
        self.tokens.store(Arc::new(StoredTokens {
            access_token: Some(access_token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        }));
        Ok(())
    }

    fn set_access_token(&self, access_token: &str) -> StoreResult<()> {
        self.tokens.rcu(|current| StoredTokens {
            access_token: Some(access_token.to_string()),
            refresh_token: current.refresh_token.clone(),
        });
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.tokens.store(Arc::new(StoredTokens::default()));
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTokenStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::{StoredTokens, TokenStore};
    use crate::error::{StoreError, StoreResult};
    use directories::ProjectDirs;
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};
    use tracing::{debug, warn};

    /// Token store backed by a JSON file, surviving process restarts
    ///
    /// The file is re-read on every access so that a second process sharing it
    /// (or a logout from another shell) is observed immediately.
    #[derive(Debug, Clone)]
    pub struct FileTokenStore {
        path: PathBuf,
    }

    impl FileTokenStore {
        /// Use the given file. It is created on the first write.
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// Platform data directory location, e.g. `~/.local/share/avatarmart/tokens.json`
        pub fn default_path() -> Option<PathBuf> {
            ProjectDirs::from("com", "Avatarmart", "avatarmart")
                .map(|dirs| dirs.data_dir().join("tokens.json"))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load(&self) -> StoredTokens {
            match self.try_load() {
                Ok(tokens) => tokens,
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "Ignoring unreadable token file");
                    StoredTokens::default()
                }
            }
        }

        fn try_load(&self) -> StoreResult<StoredTokens> {
            match fs::read_to_string(&self.path) {
                Ok(content) => Ok(serde_json::from_str(&content)?),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredTokens::default()),
                Err(err) => Err(err.into()),
            }
        }

        fn save(&self, tokens: &StoredTokens) -> StoreResult<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            let content = serde_json::to_string_pretty(tokens)?;
            let tmp_path = self.path.with_extension("json.tmp");
            fs::write(&tmp_path, content)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
            }

            fs::rename(&tmp_path, &self.path).map_err(|err| {
                StoreError::io_error(format!(
                    "failed to move token file into place at {}: {err}",
                    self.path.display()
                ))
            })?;
            debug!(path = %self.path.display(), "Token file written");
            Ok(())
        }
    }

    impl TokenStore for FileTokenStore {
        fn access_token(&self) -> Option<String> {
            self.load().access_token
        }

        fn refresh_token(&self) -> Option<String> {
            self.load().refresh_token
        }

        fn set_tokens(&self, access_token: &str, refresh_token: &str) -> StoreResult<()> {
            self.save(&StoredTokens {
                access_token: Some(access_token.to_string()),
                refresh_token: Some(refresh_token.to_string()),
            })
        }

        fn set_access_token(&self, access_token: &str) -> StoreResult<()> {
            let mut tokens = self.load();
            tokens.access_token = Some(access_token.to_string());
            self.save(&tokens)
        }

        fn clear(&self) -> StoreResult<()> {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
    }
}
