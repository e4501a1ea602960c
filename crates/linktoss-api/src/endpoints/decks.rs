//! Deck endpoints.

use std::sync::Arc;

use linktoss_common::{ApiError, ApiResult};

use crate::client::ApiClient;
use crate::contracts::{Deck, DeckCreate, DeckTree, DeckUpdate};
use crate::transport::ApiRequest;

/// Client for the `/decks/` endpoint group.
#[derive(Clone)]
pub struct DecksApi {
    client: Arc<ApiClient>,
}

impl DecksApi {
    /// Create a new decks endpoint group.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List direct children of a deck, or root decks when `parent` is absent.
    pub async fn list(&self, parent: Option<&str>) -> ApiResult<Vec<Deck>> {
        let request = ApiRequest::get("/decks/").with_opt_query("parent", parent);
        self.client.send(request).await
    }

    /// Create a deck.
    pub async fn create(&self, input: &DeckCreate) -> ApiResult<Deck> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client.send(ApiRequest::post("/decks/", body)).await
    }

    /// Fetch the full recursive subtree rooted at `deck_id`, or the whole
    /// forest when absent.
    pub async fn tree(&self, deck_id: Option<&str>) -> ApiResult<Vec<DeckTree>> {
        let request = ApiRequest::get("/decks/tree/").with_opt_query("deck_id", deck_id);
        self.client.send(request).await
    }

    /// Fetch a single deck.
    pub async fn get(&self, id: &str) -> ApiResult<Deck> {
        self.client.send(ApiRequest::get(format!("/decks/{id}/"))).await
    }

    /// Update a deck.
    pub async fn update(&self, id: &str, input: &DeckUpdate) -> ApiResult<Deck> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client
            .send(ApiRequest::put(format!("/decks/{id}/"), body))
            .await
    }

    /// Soft-delete a deck. The backend cascades to all descendant decks
    /// and the drops reached through them.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .send_unit(ApiRequest::delete(format!("/decks/{id}/")))
            .await
    }
}
