//! User and auth endpoints.

use std::sync::Arc;

use linktoss_common::{ApiError, ApiResult};

use crate::client::ApiClient;
use crate::contracts::{
    MessageResponse, Provider, RefreshToken, SocialLoginRequest, Token, User, UserProfileUpdate,
};
use crate::transport::ApiRequest;

/// Client for the `/users/` endpoint group.
#[derive(Clone)]
pub struct UsersApi {
    client: Arc<ApiClient>,
}

impl UsersApi {
    /// Create a new users endpoint group.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch the current user's profile.
    pub async fn me(&self) -> ApiResult<User> {
        self.client.send(ApiRequest::get("/users/profile/me/")).await
    }

    /// Update the current user's profile.
    pub async fn update_profile(&self, input: &UserProfileUpdate) -> ApiResult<User> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client
            .send(ApiRequest::patch("/users/profile/me/update/", body))
            .await
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// Normally invoked by the client's 401 interceptor rather than
    /// directly; exposed for explicit renewal flows.
    pub async fn refresh(&self, refresh_token: String) -> ApiResult<Token> {
        let body = serde_json::to_value(RefreshToken { refresh_token }).map_err(ApiError::from)?;
        self.client
            .send(ApiRequest::post("/users/refresh/", body).unauthenticated())
            .await
    }

    /// Delete the current user's account.
    pub async fn withdraw(&self) -> ApiResult<MessageResponse> {
        self.client.send(ApiRequest::delete("/users/withdraw/")).await
    }

    /// Exchange a social/ID token (or native credentials) for a JWT pair.
    pub async fn login(
        &self,
        provider: Provider,
        request: &SocialLoginRequest,
    ) -> ApiResult<Token> {
        let body = serde_json::to_value(request).map_err(ApiError::from)?;
        let path = format!("/users/{}/login/", provider.as_str());
        self.client
            .send(ApiRequest::post(path, body).unauthenticated())
            .await
    }
}
