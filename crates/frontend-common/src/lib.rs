pub mod config;
pub mod router;
pub mod session;
#[cfg(target_arch = "wasm32")]
pub mod storage;

pub use crate::config::{AppConfig, ConfigError, Mode};
pub use router::{Page, ROUTES, Route, RouteEntry};
pub use session::{AuthOutcome, AuthSession};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageTokenStore;
