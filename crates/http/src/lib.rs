//! Avatarmart HTTP client
//!
//! A thin REST client over `reqwest` that attaches the stored bearer token to
//! every request and, when the server answers 401, silently exchanges the
//! refresh token for a new access token and resubmits the request once.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::error::{ClientError, ErrorKind};
pub use client::request::{ApiRequest, MultipartForm, RequestBody};
pub use client::{MarketClient, MarketClientBuilder};
pub use types::{AvatarUpdate, NewTrainingRequest, Upload};
