//! Session state: the access/refresh token pair and current user identity.
//!
//! One [`Session`] is owned per [`ApiClient`](crate::ApiClient) and shared
//! by reference with everything that issues requests. It is populated on
//! login and refresh, and cleared on logout, withdrawal, or refresh failure.

use std::sync::{Mutex, PoisonError};

use crate::contracts::Token;

/// Access/refresh token pair held by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Bearer token attached to authenticated requests.
    pub access_token: String,
    /// Token exchanged for a new pair when the access token expires.
    pub refresh_token: String,
}

#[derive(Debug, Default)]
struct SessionState {
    tokens: Option<TokenPair>,
    user_id: Option<i64>,
}

/// Process-wide mutable auth state with a clear lifecycle.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Create an empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store the token pair and user identity from a login/refresh response.
    pub fn store(&self, token: &Token) {
        let mut state = self.lock();
        state.tokens = Some(TokenPair {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
        });
        state.user_id = Some(token.user_id);
    }

    /// Replace only the token pair, keeping the user identity.
    pub fn set_tokens(&self, tokens: TokenPair) {
        self.lock().tokens = Some(tokens);
    }

    /// Clear all auth state. Terminal for the session until the next login.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.tokens = None;
        state.user_id = None;
    }

    /// Current access token, if authenticated.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.lock().tokens.as_ref().map(|t| t.access_token.clone())
    }

    /// Current refresh token, if authenticated.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.lock()
            .tokens
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    /// Current user ID, if known.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.lock().user_id
    }

    /// Whether a token pair is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().tokens.is_some()
    }
}
