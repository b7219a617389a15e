//! Authentication API client methods

use super::{ClientError, MarketClient};
use crate::client::request::ApiRequest;
use avatarmart_core::{
    LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, User,
};

impl MarketClient {
    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        let req = ApiRequest::post("/auth/register")
            .json(request)?
            .without_refresh();
        self.send(req).await
    }

    /// Exchange credentials for a token pair and the user record
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = ApiRequest::post("/auth/login")
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })?
            .without_refresh();
        self.send(req).await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Sent directly on the transport, without credentials or 401
    /// interception, so a rejected refresh token never triggers another refresh.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Get the user the current access token belongs to
    pub async fn me(&self) -> Result<User, ClientError> {
        self.send(ApiRequest::get("/auth/me")).await
    }

    /// Ask for the influencer role. Current servers reject this with 403;
    /// upgrades are approved by administrators.
    pub async fn upgrade_to_seller(&self) -> Result<User, ClientError> {
        self.send(ApiRequest::post("/auth/upgrade-to-seller")).await
    }
}
