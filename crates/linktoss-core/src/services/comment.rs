//! Comment service.

use linktoss_api::CommentsApi;
use linktoss_api::contracts::{Comment, CommentCreate, CommentUpdate};
use linktoss_common::{ApiError, ApiResult};
use validator::Validate;

use crate::tree::CommentForest;

/// Service for threaded comments on drops.
///
/// Deleting a comment is owner-only: the backend answers 403 for anyone
/// else, which surfaces as [`ApiError::Forbidden`], deliberately distinct
/// from the [`ApiError::NotFound`] of an already-deleted comment so the
/// caller can show "you can't do that" rather than "that no longer exists".
#[derive(Clone)]
pub struct CommentService {
    comments: CommentsApi,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comments: CommentsApi) -> Self {
        Self { comments }
    }

    /// Load the full reply forest for a drop. All-or-nothing, like the
    /// deck tree.
    pub async fn load_tree(&self, drop_id: &str) -> ApiResult<CommentForest> {
        let roots = self.comments.tree(drop_id).await?;
        Ok(CommentForest::new(roots))
    }

    /// List top-level comments on a drop, one level only.
    pub async fn list(&self, drop_id: &str) -> ApiResult<Vec<Comment>> {
        self.comments.list(drop_id).await
    }

    /// List direct replies of a comment, one level only.
    pub async fn replies(&self, id: &str) -> ApiResult<Vec<Comment>> {
        self.comments.replies(id).await
    }

    /// Fetch a single comment.
    pub async fn get(&self, id: &str) -> ApiResult<Comment> {
        self.comments.get(id).await
    }

    /// Create a comment, optionally as a reply.
    pub async fn create(&self, mut input: CommentCreate) -> ApiResult<Comment> {
        input.content = input.content.trim().to_string();
        if input.content.is_empty() {
            return Err(ApiError::Validation(
                "Comment content must not be empty".to_string(),
            ));
        }
        input.validate()?;

        let comment = self.comments.create(&input).await?;
        tracing::debug!(
            comment_id = %comment.id,
            drop_id = %comment.drop,
            parent = ?comment.parent,
            "Created comment"
        );
        Ok(comment)
    }

    /// Create a comment and insert the confirmed node into a held forest.
    ///
    /// A reply lands under its parent, never as a top-level entry, so the
    /// nesting in the view matches what the next tree fetch would show.
    pub async fn create_in(
        &self,
        forest: &mut CommentForest,
        input: CommentCreate,
    ) -> ApiResult<Comment> {
        let comment = self.create(input).await?;
        if !forest.insert(&comment) {
            tracing::debug!(comment_id = %comment.id, "Created reply outside the held thread");
        }
        Ok(comment)
    }

    /// Update a comment's content. Owner-only.
    pub async fn update(&self, id: &str, content: &str) -> ApiResult<Comment> {
        let input = CommentUpdate {
            content: content.trim().to_string(),
        };
        if input.content.is_empty() {
            return Err(ApiError::Validation(
                "Comment content must not be empty".to_string(),
            ));
        }
        input.validate()?;

        self.comments.update(id, &input).await
    }

    /// Soft-delete a comment and its entire reply subtree. Owner-only.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.comments.delete(id).await?;
        tracing::debug!(comment_id = %id, "Deleted comment thread");
        Ok(())
    }

    /// Soft-delete a comment and drop its reply subtree from a held
    /// forest. The forest is only touched after the backend confirms.
    pub async fn delete_from(&self, forest: &mut CommentForest, id: &str) -> ApiResult<()> {
        self.delete(id).await?;
        forest.remove_subtree(id);
        Ok(())
    }
}
