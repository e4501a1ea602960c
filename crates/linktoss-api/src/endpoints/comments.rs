//! Comment endpoints.
//!
//! Comments live under `/drops/comments/` on the backend even though they
//! form their own resource; the paths here keep that quirk verbatim.

use std::sync::Arc;

use linktoss_common::{ApiError, ApiResult};

use crate::client::ApiClient;
use crate::contracts::{Comment, CommentCreate, CommentTree, CommentUpdate};
use crate::transport::ApiRequest;

/// Client for the `/drops/comments/` endpoint group.
#[derive(Clone)]
pub struct CommentsApi {
    client: Arc<ApiClient>,
}

impl CommentsApi {
    /// Create a new comments endpoint group.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List top-level comments on a drop.
    pub async fn list(&self, drop_id: &str) -> ApiResult<Vec<Comment>> {
        let request = ApiRequest::get("/drops/comments/").with_query("drop_id", drop_id);
        self.client.send(request).await
    }

    /// Create a comment, optionally as a reply to `parent`.
    pub async fn create(&self, input: &CommentCreate) -> ApiResult<Comment> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client
            .send(ApiRequest::post("/drops/comments/", body))
            .await
    }

    /// Fetch the full recursive reply tree for a drop.
    pub async fn tree(&self, drop_id: &str) -> ApiResult<Vec<CommentTree>> {
        let request = ApiRequest::get("/drops/comments/tree/").with_query("drop_id", drop_id);
        self.client.send(request).await
    }

    /// Fetch a single comment.
    pub async fn get(&self, id: &str) -> ApiResult<Comment> {
        self.client
            .send(ApiRequest::get(format!("/drops/comments/{id}/")))
            .await
    }

    /// Update a comment. Owner-only; others receive a 403.
    pub async fn update(&self, id: &str, input: &CommentUpdate) -> ApiResult<Comment> {
        let body = serde_json::to_value(input).map_err(ApiError::from)?;
        self.client
            .send(ApiRequest::put(format!("/drops/comments/{id}/"), body))
            .await
    }

    /// Soft-delete a comment and its entire reply subtree. Owner-only.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .send_unit(ApiRequest::delete(format!("/drops/comments/{id}/")))
            .await
    }

    /// List direct replies of a comment, one level only.
    pub async fn replies(&self, id: &str) -> ApiResult<Vec<Comment>> {
        self.client
            .send(ApiRequest::get(format!("/drops/comments/{id}/replies/")))
            .await
    }
}
