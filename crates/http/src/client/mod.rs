//! Avatarmart API client

pub mod auth;
pub mod error;
pub mod market;
pub mod request;

use avatarmart_core::{MemoryTokenStore, TokenStore};
use error::ClientError;
use request::{ApiRequest, RequestBody};
use reqwest::{Client, ClientBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Marketplace API client
///
/// Every request carries `Authorization: Bearer <access_token>` when the token
/// store holds one. A 401 triggers at most one refresh and at most one
/// resubmission of the original request.
#[derive(Clone)]
pub struct MarketClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresh_lock: Arc<Mutex<()>>,
}

impl MarketClient {
    /// Create a new client with an in-memory token store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> MarketClientBuilder {
        MarketClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store consulted before every request
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Send a request and decode the JSON response
    pub async fn send<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, ClientError> {
        let bearer = self.tokens.access_token();
        let response = self.dispatch(&request, bearer.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.is_retried() {
            return Self::decode(response).await;
        }

        let rejected = ClientError::from_response(response).await;
        request.mark_retried();

        let Some(access_token) = self.refresh_after_unauthorized(bearer.as_deref()).await? else {
            return Err(rejected);
        };

        debug!(
            method = %request.method(),
            path = request.path(),
            "Resubmitting request with refreshed access token"
        );
        let response = self.dispatch(&request, Some(&access_token)).await?;
        Self::decode(response).await
    }

    /// Resolve a 401 into a fresh access token.
    ///
    /// Returns `Ok(None)` when there is nothing to refresh with, in which case
    /// the caller propagates the original 401. Concurrent callers are
    /// serialized; a caller that finds a different access token already
    /// stored reuses it instead of refreshing a second time.
    async fn refresh_after_unauthorized(
        &self,
        rejected_token: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.access_token();
        if current.is_some() && current.as_deref() != rejected_token {
            debug!("Access token was refreshed by a concurrent request");
            return Ok(current);
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            debug!("No refresh token stored, propagating 401");
            return Ok(None);
        };

        match self.refresh(&refresh_token).await {
            Ok(refreshed) => {
                self.tokens.set_access_token(&refreshed.access_token)?;
                info!("Access token refreshed");
                Ok(Some(refreshed.access_token))
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, clearing stored tokens");
                if let Err(store_err) = self.tokens.clear() {
                    warn!(error = %store_err, "Failed to clear stored tokens");
                }
                Err(err)
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Response, ClientError> {
        let url = self.url(request.path());
        let mut builder = self.client.request(request.method().clone(), url);

        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        debug!(
            method = %request.method(),
            path = request.path(),
            authenticated = bearer.is_some(),
            retried = request.is_retried(),
            "Dispatching request"
        );
        Ok(builder.send().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        if response.status().is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(ClientError::from_response(response).await)
        }
    }
}

/// Builder for MarketClient
#[derive(Default)]
pub struct MarketClientBuilder {
    base_url: Option<String>,
    tokens: Option<Arc<dyn TokenStore>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl MarketClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the token store. Defaults to an empty in-memory store.
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the request timeout (ignored on wasm)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<MarketClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url must not be empty".into()));
        }

        #[cfg_attr(target_arch = "wasm32", allow(unused_mut))]
        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(timeout) = self.timeout {
                client_builder = client_builder.timeout(timeout);
            }
            let user_agent = self
                .user_agent
                .unwrap_or_else(|| concat!("avatarmart-client/", env!("CARGO_PKG_VERSION")).into());
            client_builder = client_builder.user_agent(user_agent);
        }

        #[cfg(target_arch = "wasm32")]
        let _ = (self.timeout, self.user_agent); // The browser owns both

        let client = client_builder.build()?;

        Ok(MarketClient {
            client,
            base_url,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }
}
