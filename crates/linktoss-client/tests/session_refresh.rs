//! Session lifecycle integration tests.
//!
//! Verify the one-shot refresh-and-retry contract end to end: a 401
//! triggers exactly one refresh, a failed refresh logs the handle out,
//! and nothing ever loops.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use linktoss_api::{MockBackend, Transport};
use linktoss_client::{ApiError, DeckCreate, LinkToss, Provider};

async fn connect() -> (Arc<MockBackend>, LinkToss) {
    let backend = Arc::new(MockBackend::new());
    let linktoss = LinkToss::with_transport(Arc::clone(&backend) as Arc<dyn Transport>);
    linktoss
        .users
        .login(Provider::Google, "tester")
        .await
        .unwrap();
    (backend, linktoss)
}

#[tokio::test]
async fn test_expired_token_refreshes_exactly_once_and_succeeds() {
    let (backend, linktoss) = connect().await;
    linktoss
        .decks
        .create(DeckCreate {
            name: "Reading".to_string(),
            ..DeckCreate::default()
        })
        .await
        .unwrap();

    backend.expire_access_tokens();
    backend.clear_request_log();

    let roots = linktoss.decks.load_children(None).await.unwrap();
    assert_eq!(roots.len(), 1);

    // Original request, one refresh, one retry. Nothing more.
    assert_eq!(
        backend.request_log(),
        vec![
            "GET /decks/".to_string(),
            "POST /users/refresh/".to_string(),
            "GET /decks/".to_string(),
        ]
    );
    assert!(linktoss.session().is_authenticated());
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_never_loops() {
    let (backend, linktoss) = connect().await;

    backend.expire_access_tokens();
    backend.disable_refresh();
    backend.clear_request_log();

    let result = linktoss.decks.load_children(None).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));

    // One request, one refresh attempt, no retry, no second refresh.
    assert_eq!(
        backend.request_log(),
        vec![
            "GET /decks/".to_string(),
            "POST /users/refresh/".to_string(),
        ]
    );
    assert!(!linktoss.session().is_authenticated());

    // With the session gone, later calls fail fast without refreshing.
    backend.clear_request_log();
    let result = linktoss.decks.load_children(None).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(backend.request_log(), vec!["GET /decks/".to_string()]);
}

#[tokio::test]
async fn test_relogin_after_session_loss() {
    let (backend, linktoss) = connect().await;

    backend.expire_access_tokens();
    backend.disable_refresh();
    let _ = linktoss.decks.load_children(None).await;
    assert!(!linktoss.session().is_authenticated());

    // A fresh login restores service. Refresh stays broken, but the new
    // access token is valid so no refresh is needed.
    linktoss
        .users
        .login(Provider::Google, "tester")
        .await
        .unwrap();
    assert!(linktoss.session().is_authenticated());
    let roots = linktoss.decks.load_children(None).await.unwrap();
    assert!(roots.is_empty());
}
