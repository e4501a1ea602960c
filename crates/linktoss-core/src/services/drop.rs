//! Drop service.

use linktoss_api::DropsApi;
use linktoss_api::contracts::{Drop, DropCreate, DropUpdate};
use linktoss_common::{ApiError, ApiResult};
use url::Url;
use validator::Validate;

/// Service for saved links: CRUD plus full-text/tag search.
#[derive(Clone)]
pub struct DropService {
    drops: DropsApi,
}

impl DropService {
    /// Create a new drop service.
    #[must_use]
    pub const fn new(drops: DropsApi) -> Self {
        Self { drops }
    }

    /// List the drops in a deck, one level, backend order.
    pub async fn list(&self, deck_id: &str) -> ApiResult<Vec<Drop>> {
        self.drops.list(deck_id).await
    }

    /// Fetch a single drop.
    pub async fn get(&self, id: &str) -> ApiResult<Drop> {
        self.drops.get(id).await
    }

    /// Create a drop.
    ///
    /// Title and URL are required; the URL must carry a scheme and host so
    /// an input the backend would reject anyway never costs a round trip.
    pub async fn create(&self, mut input: DropCreate) -> ApiResult<Drop> {
        input.title = input.title.trim().to_string();
        if input.title.is_empty() {
            return Err(ApiError::Validation(
                "Drop title must not be empty".to_string(),
            ));
        }
        validate_drop_url(&input.url)?;
        input.tags = canonical_tags(input.tags);
        input.validate()?;

        let drop = self.drops.create(&input).await?;
        tracing::debug!(drop_id = %drop.id, deck_id = %drop.deck, "Created drop");
        Ok(drop)
    }

    /// Update a drop.
    pub async fn update(&self, id: &str, mut input: DropUpdate) -> ApiResult<Drop> {
        if let Some(ref title) = input.title {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(ApiError::Validation(
                    "Drop title must not be empty".to_string(),
                ));
            }
            input.title = Some(trimmed.to_string());
        }
        if let Some(ref url) = input.url {
            validate_drop_url(url)?;
        }
        if let Some(tags) = input.tags.take() {
            input.tags = Some(canonical_tags(tags));
        }
        input.validate()?;

        self.drops.update(id, &input).await
    }

    /// Soft-delete a drop. Terminal; a drop has no children to cascade to.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.drops.delete(id).await?;
        tracing::debug!(drop_id = %id, "Deleted drop");
        Ok(())
    }

    /// Full-text and tag search over drops.
    pub async fn search(&self, query: Option<&str>, tags: &[String]) -> ApiResult<Vec<Drop>> {
        self.drops.search(query, tags).await
    }
}

/// Canonicalize tags: trim, drop empties, dedup keeping the first
/// occurrence so display order is preserved.
fn canonical_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// A drop URL must be non-empty, at most 200 characters, and parse as a
/// URI with a scheme and host.
fn validate_drop_url(url: &str) -> ApiResult<()> {
    if url.is_empty() {
        return Err(ApiError::Validation("Drop URL must not be empty".to_string()));
    }
    if url.len() > 200 {
        return Err(ApiError::Validation(
            "Drop URL must be at most 200 characters".to_string(),
        ));
    }
    let parsed =
        Url::parse(url).map_err(|e| ApiError::Validation(format!("Invalid drop URL: {e}")))?;
    if !parsed.has_host() {
        return Err(ApiError::Validation(
            "Drop URL must include a host".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_requires_scheme_and_host() {
        assert!(validate_drop_url("https://arxiv.org/abs/1706.03762").is_ok());
        assert!(validate_drop_url("http://localhost:3000/path").is_ok());

        assert!(validate_drop_url("").is_err());
        assert!(validate_drop_url("arxiv.org/abs/1706.03762").is_err());
        assert!(validate_drop_url("mailto:someone@example.com").is_err());

        let long = format!("https://example.com/{}", "a".repeat(200));
        assert!(validate_drop_url(&long).is_err());
    }

    #[test]
    fn test_tags_dedup_preserves_first_seen_order() {
        let tags = vec![
            "nlp".to_string(),
            " transformer ".to_string(),
            "nlp".to_string(),
            String::new(),
            "attention".to_string(),
        ];
        assert_eq!(
            canonical_tags(tags),
            vec!["nlp", "transformer", "attention"]
        );
    }
}
