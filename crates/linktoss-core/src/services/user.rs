//! User service.

use std::sync::Arc;

use linktoss_api::contracts::{
    MessageResponse, Provider, SocialLoginRequest, Token, User, UserProfileUpdate,
};
use linktoss_api::{Session, UsersApi};
use linktoss_common::ApiResult;
use validator::Validate;

/// Service for authentication and the current user's profile.
///
/// Owns the session lifecycle: login and refresh populate the token pair,
/// logout/withdrawal/refresh-failure clear it. Routine token renewal is
/// the request client's job; this service only handles the explicit ends
/// of the lifecycle.
#[derive(Clone)]
pub struct UserService {
    users: UsersApi,
    session: Arc<Session>,
}

impl UserService {
    /// Create a new user service sharing the client's session.
    #[must_use]
    pub const fn new(users: UsersApi, session: Arc<Session>) -> Self {
        Self { users, session }
    }

    /// Exchange a provider-issued ID token for a JWT pair and store it.
    pub async fn login(&self, provider: Provider, id_token: &str) -> ApiResult<Token> {
        let token = self
            .users
            .login(provider, &SocialLoginRequest::from_id_token(id_token))
            .await?;
        self.session.store(&token);
        tracing::info!(user_id = token.user_id, provider = provider.as_str(), "Logged in");
        Ok(token)
    }

    /// Native identifier/password login.
    pub async fn login_native(&self, identifier: &str, password: &str) -> ApiResult<Token> {
        let token = self
            .users
            .login(
                Provider::Native,
                &SocialLoginRequest::native(identifier, password),
            )
            .await?;
        self.session.store(&token);
        tracing::info!(user_id = token.user_id, "Logged in");
        Ok(token)
    }

    /// Drop the local session. No backend call is involved; the tokens
    /// simply stop being used.
    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("Logged out");
    }

    /// Fetch the current user's profile.
    pub async fn me(&self) -> ApiResult<User> {
        self.users.me().await
    }

    /// Update the current user's profile.
    pub async fn update_profile(&self, input: UserProfileUpdate) -> ApiResult<User> {
        input.validate()?;
        self.users.update_profile(&input).await
    }

    /// Delete the current user's account and clear the session.
    pub async fn withdraw(&self) -> ApiResult<MessageResponse> {
        let response = self.users.withdraw().await?;
        self.session.clear();
        tracing::info!("Account withdrawn");
        Ok(response)
    }

    /// The session this service manages.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use linktoss_api::{ApiClient, MockBackend, Transport};
    use linktoss_common::ApiError;

    fn service(backend: Arc<MockBackend>) -> (Arc<ApiClient>, UserService) {
        let client = Arc::new(ApiClient::new(backend as Arc<dyn Transport>));
        let service = UserService::new(
            UsersApi::new(Arc::clone(&client)),
            Arc::clone(client.session()),
        );
        (client, service)
    }

    #[tokio::test]
    async fn test_login_populates_session() {
        let (client, users) = service(Arc::new(MockBackend::new()));
        assert!(!client.session().is_authenticated());

        let token = users.login(Provider::Google, "tester").await.unwrap();
        assert!(client.session().is_authenticated());
        assert_eq!(client.session().user_id(), Some(token.user_id));

        let me = users.me().await.unwrap();
        assert_eq!(me.username.as_deref(), Some("tester"));

        users.logout();
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_profile_update_validates_email() {
        let (_client, users) = service(Arc::new(MockBackend::new()));
        users.login(Provider::Google, "tester").await.unwrap();

        let result = users
            .update_profile(UserProfileUpdate {
                email: Some("not-an-email".to_string()),
                ..UserProfileUpdate::default()
            })
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let updated = users
            .update_profile(UserProfileUpdate {
                email: Some("tester@example.com".to_string()),
                ..UserProfileUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("tester@example.com"));
    }

    #[tokio::test]
    async fn test_withdraw_clears_session() {
        let (client, users) = service(Arc::new(MockBackend::new()));
        users.login(Provider::Google, "tester").await.unwrap();

        let response = users.withdraw().await.unwrap();
        assert_eq!(response.message, "account deleted");
        assert!(!client.session().is_authenticated());
    }
}
