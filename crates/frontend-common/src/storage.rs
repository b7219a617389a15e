//! Browser token persistence
//!
//! Tokens live in `localStorage` under the fixed `access_token` and
//! `refresh_token` keys so a reload keeps the session.

use avatarmart_core::{
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, StoreError, StoreResult, TokenStore,
};
use gloo::storage::{LocalStorage, Storage};

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageTokenStore;

impl LocalStorageTokenStore {
    pub fn new() -> Self {
        Self
    }

    fn get(key: &str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = ?err, "localStorage read failed");
                None
            }
        }
    }

    fn set(key: &str, value: &str) -> StoreResult<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StoreError::unavailable(format!("localStorage write failed: {err:?}")))
    }

    fn remove(key: &str) -> StoreResult<()> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|err| StoreError::unavailable(format!("localStorage remove failed: {err:?}")))
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn access_token(&self) -> Option<String> {
        Self::get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        Self::get(REFRESH_TOKEN_KEY)
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> StoreResult<()> {
        Self::set(ACCESS_TOKEN_KEY, access_token)?;
        Self::set(REFRESH_TOKEN_KEY, refresh_token)
    }

    fn set_access_token(&self, access_token: &str) -> StoreResult<()> {
        Self::set(ACCESS_TOKEN_KEY, access_token)
    }

    fn clear(&self) -> StoreResult<()> {
        Self::remove(ACCESS_TOKEN_KEY)?;
        Self::remove(REFRESH_TOKEN_KEY)
    }
}
