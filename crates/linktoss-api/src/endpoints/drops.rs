//! Drop endpoints.

use std::sync::Arc;

use linktoss_common::{ApiError, ApiResult};

use crate::client::ApiClient;
use crate::contracts::{Drop, DropCreate, DropUpdate};
use crate::transport::ApiRequest;

/// Client for the `/drops/` endpoint group.
#[derive(Clone)]
pub struct DropsApi {
    client: Arc<ApiClient>,
}

impl DropsApi {
    /// Create a new drops endpoint group.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List the drops in a deck.
    pub async fn list(&self, deck_id: &str) -> ApiResult<Vec<Drop>> {
        let request = ApiRequest::get("/drops/").with_query("deck_id", deck_id);
        self.client.send(request).await
    }

    /// Create a drop.
    pub async fn create(&self, input: &DropCreate) -> ApiResult<Drop> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client.send(ApiRequest::post("/drops/", body)).await
    }

    /// Full-text and tag search over drops.
    ///
    /// Tags are comma-joined here and nowhere else; callers always work
    /// with `&[String]`.
    pub async fn search(&self, query: Option<&str>, tags: &[String]) -> ApiResult<Vec<Drop>> {
        let mut request = ApiRequest::get("/drops/search/").with_opt_query("query", query);
        if !tags.is_empty() {
            request = request.with_query("tags", tags.join(","));
        }
        self.client.send(request).await
    }

    /// Fetch a single drop.
    pub async fn get(&self, id: &str) -> ApiResult<Drop> {
        self.client.send(ApiRequest::get(format!("/drops/{id}/"))).await
    }

    /// Update a drop.
    pub async fn update(&self, id: &str, input: &DropUpdate) -> ApiResult<Drop> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client
            .send(ApiRequest::put(format!("/drops/{id}/"), body))
            .await
    }

    /// Soft-delete a drop. A drop has no children, so there is no cascade.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .send_unit(ApiRequest::delete(format!("/drops/{id}/")))
            .await
    }
}
