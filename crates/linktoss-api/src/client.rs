//! Authenticated request client with the one-shot 401 refresh policy.

use std::sync::Arc;

use linktoss_common::{ApiError, ApiResult};
use serde::de::DeserializeOwned;

use crate::contracts::{RefreshToken, Token};
use crate::session::Session;
use crate::transport::{ApiRequest, RawResponse, Transport};

/// Issues requests through a [`Transport`], attaching the session's bearer
/// token and applying the refresh-once policy on 401 responses.
///
/// The retry flag is per request by construction: the refresh/retry pair
/// lives in a single call frame, so a request can never be retried twice
/// and refresh storms are impossible.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client over a transport with a fresh session.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_session(transport, Arc::new(Session::new()))
    }

    /// Create a client sharing an existing session.
    #[must_use]
    pub fn with_session(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send a request and decode the JSON response body.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.execute(&request).await?;
        serde_json::from_str(&response.body).map_err(ApiError::from)
    }

    /// Send a request whose success response carries no meaningful body
    /// (deletes answering 204).
    pub async fn send_unit(&self, request: ApiRequest) -> ApiResult<()> {
        self.execute(&request).await.map(|_| ())
    }

    async fn execute(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        let bearer = if request.requires_auth {
            self.session.access_token()
        } else {
            None
        };
        let response = self.transport.execute(request, bearer.as_deref()).await?;

        if response.status != 401 || !request.requires_auth {
            return Self::into_result(request, response);
        }

        tracing::debug!(path = %request.path, "Access token rejected, attempting refresh");
        if let Err(err) = self.refresh_session().await {
            self.session.clear();
            tracing::warn!(path = %request.path, error = %err, "Token refresh failed, session cleared");
            return Err(ApiError::Unauthorized);
        }

        let bearer = self.session.access_token();
        let retried = self.transport.execute(request, bearer.as_deref()).await?;
        if retried.status == 401 {
            // Still unauthorized with a fresh token: give up, no loop.
            self.session.clear();
            tracing::warn!(path = %request.path, "Unauthorized after refresh, session cleared");
            return Err(ApiError::Unauthorized);
        }
        Self::into_result(request, retried)
    }

    /// Exchange the stored refresh token for a new access/refresh pair.
    async fn refresh_session(&self) -> ApiResult<()> {
        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(ApiError::Unauthorized);
        };

        let body = serde_json::to_value(RefreshToken { refresh_token })?;
        let request = ApiRequest::post("/users/refresh/", body).unauthenticated();
        let response = self.transport.execute(&request, None).await?;
        if !response.is_success() {
            return Err(ApiError::Unauthorized);
        }

        let token: Token = serde_json::from_str(&response.body)?;
        self.session.store(&token);
        tracing::debug!(user_id = token.user_id, "Session tokens refreshed");
        Ok(())
    }

    fn into_result(request: &ApiRequest, response: RawResponse) -> ApiResult<RawResponse> {
        if response.is_success() {
            return Ok(response);
        }
        let error = ApiError::from_status(response.status, extract_message(&response.body));
        error.log(&request.path);
        Err(error)
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The backend answers with `{"detail": ...}`, `{"message": ...}` or a
/// validation map; fall back to the raw body when none match.
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}
