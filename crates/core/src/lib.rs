//! Avatarmart core types and the persisted session token store

pub mod error;
pub mod token_store;
pub mod types;

pub use error::{StoreError, StoreResult};
#[cfg(not(target_arch = "wasm32"))]
pub use token_store::FileTokenStore;
pub use token_store::{
    ACCESS_TOKEN_KEY, MemoryTokenStore, REFRESH_TOKEN_KEY, StoredTokens, TokenStore,
};
pub use types::{
    Avatar, Generation, Locale, LoginRequest, LoginResponse, RefreshTokenRequest,
    RefreshTokenResponse, RegisterRequest, Role, TrainingRequest, TrainingRequestStatus, User,
};
