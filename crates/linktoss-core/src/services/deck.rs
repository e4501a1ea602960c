//! Deck service.

use linktoss_api::DecksApi;
use linktoss_api::contracts::{Deck, DeckCreate, DeckUpdate};
use linktoss_common::{ApiError, ApiResult};
use validator::Validate;

use crate::tree::DeckForest;

/// Service for the deck hierarchy: loading tree and flat projections and
/// keeping caller-held forests consistent across mutations.
#[derive(Clone)]
pub struct DeckService {
    decks: DecksApi,
}

impl DeckService {
    /// Create a new deck service.
    #[must_use]
    pub const fn new(decks: DecksApi) -> Self {
        Self { decks }
    }

    /// Load the recursive deck forest, optionally scoped to one subtree.
    ///
    /// All-or-nothing: on any error no partial forest is produced.
    pub async fn load_tree(&self, root: Option<&str>) -> ApiResult<DeckForest> {
        let roots = self.decks.tree(root).await?;
        Ok(DeckForest::new(roots))
    }

    /// Load one level of decks: the children of `parent`, or the root
    /// decks when absent. Never recurses.
    pub async fn load_children(&self, parent: Option<&str>) -> ApiResult<Vec<Deck>> {
        self.decks.list(parent).await
    }

    /// Fetch a single deck.
    pub async fn get(&self, id: &str) -> ApiResult<Deck> {
        self.decks.get(id).await
    }

    /// Create a deck.
    ///
    /// The name is trimmed and must be 1-255 characters; the backend
    /// remains the source of truth for uniqueness and sibling ordering.
    pub async fn create(&self, mut input: DeckCreate) -> ApiResult<Deck> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(ApiError::Validation(
                "Deck name must not be empty".to_string(),
            ));
        }
        input.validate()?;

        let deck = self.decks.create(&input).await?;
        tracing::debug!(deck_id = %deck.id, parent = ?deck.parent, "Created deck");
        Ok(deck)
    }

    /// Create a deck and insert the confirmed node into a held forest,
    /// under its parent or as a new root.
    pub async fn create_in(&self, forest: &mut DeckForest, input: DeckCreate) -> ApiResult<Deck> {
        let deck = self.create(input).await?;
        if !forest.insert(&deck) {
            tracing::debug!(deck_id = %deck.id, "Created deck outside the held subtree");
        }
        Ok(deck)
    }

    /// Update a deck.
    pub async fn update(&self, id: &str, mut input: DeckUpdate) -> ApiResult<Deck> {
        if let Some(ref name) = input.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ApiError::Validation(
                    "Deck name must not be empty".to_string(),
                ));
            }
            input.name = Some(trimmed.to_string());
        }
        input.validate()?;

        self.decks.update(id, &input).await
    }

    /// Update a deck and reconcile a held forest, relocating the subtree
    /// when the parent changed.
    pub async fn update_in(
        &self,
        forest: &mut DeckForest,
        id: &str,
        input: DeckUpdate,
    ) -> ApiResult<Deck> {
        let deck = self.update(id, input).await?;
        forest.apply_update(&deck);
        Ok(deck)
    }

    /// Soft-delete a deck.
    ///
    /// The backend cascades to every descendant deck and the drops
    /// reached through them; callers must treat the whole subtree as gone.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.decks.delete(id).await?;
        tracing::debug!(deck_id = %id, "Deleted deck subtree");
        Ok(())
    }

    /// Soft-delete a deck and drop its subtree from a held forest.
    ///
    /// The forest is only touched after the backend confirms; a failed
    /// delete leaves it intact.
    pub async fn delete_from(&self, forest: &mut DeckForest, id: &str) -> ApiResult<()> {
        self.delete(id).await?;
        forest.remove_subtree(id);
        Ok(())
    }
}
