//! In-memory tree projections of the deck and comment hierarchies.
//!
//! Forests are built once per fetch from the backend's tree endpoints and
//! then adjusted by targeted, id-keyed insert/remove operations after a
//! mutation is confirmed. There are no optimistic updates: callers mutate
//! a forest only with entities the backend has already accepted, so a
//! forest always reflects some consistent server state.

use linktoss_api::contracts::{Comment, CommentTree, Deck, DeckTree};

// ==================== Deck forest ====================

/// An ordered forest of deck subtrees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckForest {
    roots: Vec<DeckTree>,
}

impl DeckForest {
    /// Wrap the roots returned by the tree endpoint.
    #[must_use]
    pub const fn new(roots: Vec<DeckTree>) -> Self {
        Self { roots }
    }

    /// Root nodes in backend order.
    #[must_use]
    pub fn roots(&self) -> &[DeckTree] {
        &self.roots
    }

    /// Total number of nodes in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(nodes: &[DeckTree]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }

    /// Whether the forest holds no decks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a deck anywhere in the forest.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&DeckTree> {
        find_deck(&self.roots, id)
    }

    /// Whether a deck is present in the forest.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Direct children of a deck, in sibling order.
    #[must_use]
    pub fn children_of(&self, id: &str) -> Option<&[DeckTree]> {
        self.find(id).map(|node| node.children.as_slice())
    }

    /// Insert a confirmed deck under its parent, or as a trailing root
    /// when it has none.
    ///
    /// Depth is recomputed from the insertion point rather than taken
    /// from the response, so the held view can never disagree with its
    /// own nesting. Returns `false` when the parent is not part of this
    /// forest (a view scoped to a different subtree).
    pub fn insert(&mut self, deck: &Deck) -> bool {
        let mut node = DeckTree::from(deck.clone());
        match deck.parent.as_deref() {
            None => {
                node.depth = 0;
                self.roots.push(node);
                true
            }
            Some(parent_id) => match find_deck_mut(&mut self.roots, parent_id) {
                Some(parent) => {
                    node.depth = parent.depth + 1;
                    parent.children.push(node);
                    true
                }
                None => false,
            },
        }
    }

    /// Remove a deck and its entire subtree, returning it when found.
    pub fn remove_subtree(&mut self, id: &str) -> Option<DeckTree> {
        remove_deck(&mut self.roots, id)
    }

    /// Apply a confirmed update to the node in place, relocating the
    /// subtree when the parent changed.
    ///
    /// Returns `false` when the deck is not part of this forest. When the
    /// new parent lies outside the forest the subtree is removed from the
    /// view, mirroring what the next full reload would show.
    pub fn apply_update(&mut self, deck: &Deck) -> bool {
        let Some(current_parent) = self.parent_of(&deck.id) else {
            return false;
        };

        if current_parent.as_deref() == deck.parent.as_deref() {
            if let Some(node) = find_deck_mut(&mut self.roots, &deck.id) {
                copy_deck_fields(node, deck);
                return true;
            }
            return false;
        }

        let Some(mut subtree) = self.remove_subtree(&deck.id) else {
            return false;
        };
        copy_deck_fields(&mut subtree, deck);
        match deck.parent.as_deref() {
            None => {
                set_deck_depth(&mut subtree, 0);
                self.roots.push(subtree);
            }
            Some(parent_id) => {
                if let Some(parent) = find_deck_mut(&mut self.roots, parent_id) {
                    set_deck_depth(&mut subtree, parent.depth + 1);
                    parent.children.push(subtree);
                }
                // Parent outside this view: the subtree simply leaves it.
            }
        }
        true
    }

    /// All nodes in depth-first preorder, sibling order preserved.
    #[must_use]
    pub fn flatten(&self) -> Vec<&DeckTree> {
        fn walk<'a>(nodes: &'a [DeckTree], out: &mut Vec<&'a DeckTree>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }

    /// Parent ID of a deck: `Some(None)` for roots, `None` when absent.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<Option<String>> {
        fn walk(nodes: &[DeckTree], id: &str, parent: Option<&str>) -> Option<Option<String>> {
            for node in nodes {
                if node.id == id {
                    return Some(parent.map(ToOwned::to_owned));
                }
                if let Some(found) = walk(&node.children, id, Some(&node.id)) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id, None)
    }
}

fn find_deck<'a>(nodes: &'a [DeckTree], id: &str) -> Option<&'a DeckTree> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_deck(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_deck_mut<'a>(nodes: &'a mut [DeckTree], id: &str) -> Option<&'a mut DeckTree> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_deck_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_deck(nodes: &mut Vec<DeckTree>, id: &str) -> Option<DeckTree> {
    if let Some(position) = nodes.iter().position(|n| n.id == id) {
        return Some(nodes.remove(position));
    }
    for node in nodes {
        if let Some(removed) = remove_deck(&mut node.children, id) {
            return Some(removed);
        }
    }
    None
}

fn copy_deck_fields(node: &mut DeckTree, deck: &Deck) {
    node.name = deck.name.clone();
    node.description = deck.description.clone();
    node.color_hex = deck.color_hex.clone();
    node.order = deck.order;
    node.is_public = deck.is_public;
    node.updated_at = deck.updated_at;
}

fn set_deck_depth(node: &mut DeckTree, depth: i32) {
    node.depth = depth;
    for child in &mut node.children {
        set_deck_depth(child, depth + 1);
    }
}

// ==================== Comment forest ====================

/// An ordered forest of comment threads for a single drop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentForest {
    roots: Vec<CommentTree>,
}

impl CommentForest {
    /// Wrap the roots returned by the comment tree endpoint.
    #[must_use]
    pub const fn new(roots: Vec<CommentTree>) -> Self {
        Self { roots }
    }

    /// Top-level comments in backend order.
    #[must_use]
    pub fn roots(&self) -> &[CommentTree] {
        &self.roots
    }

    /// Total number of comments in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(nodes: &[CommentTree]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.replies)).sum()
        }
        count(&self.roots)
    }

    /// Whether the forest holds no comments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a comment anywhere in the forest.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CommentTree> {
        find_comment(&self.roots, id)
    }

    /// Whether a comment is present in the forest.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Insert a confirmed comment under its parent, or as a trailing
    /// top-level comment when it has none.
    ///
    /// A reply is only attached when its parent is present and annotates
    /// the same drop; otherwise `false` is returned and the forest is
    /// left untouched (a reply must never surface as a top-level entry).
    pub fn insert(&mut self, comment: &Comment) -> bool {
        match comment.parent.as_deref() {
            None => {
                self.roots.push(CommentTree::from(comment.clone()));
                true
            }
            Some(parent_id) => match find_comment_mut(&mut self.roots, parent_id) {
                Some(parent) if parent.drop == comment.drop => {
                    parent.replies.push(CommentTree::from(comment.clone()));
                    true
                }
                _ => false,
            },
        }
    }

    /// Remove a comment and its entire reply subtree, returning it when
    /// found.
    pub fn remove_subtree(&mut self, id: &str) -> Option<CommentTree> {
        remove_comment(&mut self.roots, id)
    }

    /// All comments in depth-first preorder, reply order preserved.
    #[must_use]
    pub fn flatten(&self) -> Vec<&CommentTree> {
        fn walk<'a>(nodes: &'a [CommentTree], out: &mut Vec<&'a CommentTree>) {
            for node in nodes {
                out.push(node);
                walk(&node.replies, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }
}

fn find_comment<'a>(nodes: &'a [CommentTree], id: &str) -> Option<&'a CommentTree> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_comment(&node.replies, id) {
            return Some(found);
        }
    }
    None
}

fn find_comment_mut<'a>(nodes: &'a mut [CommentTree], id: &str) -> Option<&'a mut CommentTree> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_comment_mut(&mut node.replies, id) {
            return Some(found);
        }
    }
    None
}

fn remove_comment(nodes: &mut Vec<CommentTree>, id: &str) -> Option<CommentTree> {
    if let Some(position) = nodes.iter().position(|n| n.id == id) {
        return Some(nodes.remove(position));
    }
    for node in nodes {
        if let Some(removed) = remove_comment(&mut node.replies, id) {
            return Some(removed);
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deck(id: &str, parent: Option<&str>, depth: i32) -> Deck {
        let now = Utc::now();
        Deck {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            color_hex: None,
            parent: parent.map(ToOwned::to_owned),
            order: 0,
            is_public: false,
            depth,
            children_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(id: &str, drop: &str, parent: Option<&str>) -> Comment {
        let now = Utc::now();
        Comment {
            id: id.to_string(),
            content: format!("comment {id}"),
            user: 1,
            user_name: "tester".to_string(),
            drop: drop.to_string(),
            parent: parent.map(ToOwned::to_owned),
            replies_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_forest() -> DeckForest {
        let mut forest = DeckForest::default();
        assert!(forest.insert(&deck("reading", None, 0)));
        assert!(forest.insert(&deck("papers", Some("reading"), 1)));
        assert!(forest.insert(&deck("blogs", Some("reading"), 1)));
        assert!(forest.insert(&deck("nlp", Some("papers"), 2)));
        forest
    }

    #[test]
    fn test_insert_places_children_under_parent() {
        let forest = sample_forest();
        assert_eq!(forest.len(), 4);
        assert_eq!(forest.roots().len(), 1);

        let children: Vec<&str> = forest
            .children_of("reading")
            .unwrap()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(children, vec!["papers", "blogs"]);
        assert_eq!(forest.find("nlp").unwrap().depth, 2);
    }

    #[test]
    fn test_insert_missing_parent_is_rejected() {
        let mut forest = sample_forest();
        assert!(!forest.insert(&deck("orphan", Some("nope"), 1)));
        assert_eq!(forest.len(), 4);
    }

    #[test]
    fn test_remove_subtree_takes_descendants() {
        let mut forest = sample_forest();
        let removed = forest.remove_subtree("papers").unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(!forest.contains("papers"));
        assert!(!forest.contains("nlp"));
        assert!(forest.contains("blogs"));
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut forest = sample_forest();
        assert!(forest.remove_subtree("nope").is_none());
        assert_eq!(forest.len(), 4);
    }

    #[test]
    fn test_flatten_preserves_sibling_order() {
        let forest = sample_forest();
        let ids: Vec<&str> = forest.flatten().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["reading", "papers", "nlp", "blogs"]);
    }

    #[test]
    fn test_apply_update_in_place() {
        let mut forest = sample_forest();
        let mut updated = deck("blogs", Some("reading"), 1);
        updated.name = "Weblogs".to_string();
        assert!(forest.apply_update(&updated));
        assert_eq!(forest.find("blogs").unwrap().name, "Weblogs");
        assert_eq!(forest.len(), 4);
    }

    #[test]
    fn test_apply_update_reparents_and_fixes_depth() {
        let mut forest = sample_forest();
        // Move "papers" (with its "nlp" child) to the top level.
        let moved = deck("papers", None, 0);
        assert!(forest.apply_update(&moved));

        assert_eq!(forest.roots().len(), 2);
        assert_eq!(forest.parent_of("papers"), Some(None));
        assert_eq!(forest.find("papers").unwrap().depth, 0);
        assert_eq!(forest.find("nlp").unwrap().depth, 1);

        // And back under "blogs".
        let moved = deck("papers", Some("blogs"), 0);
        assert!(forest.apply_update(&moved));
        assert_eq!(
            forest.parent_of("papers"),
            Some(Some("blogs".to_string()))
        );
        assert_eq!(forest.find("nlp").unwrap().depth, 3);
    }

    #[test]
    fn test_comment_reply_nests_under_parent() {
        let mut forest = CommentForest::default();
        assert!(forest.insert(&comment("c1", "drop-1", None)));
        assert!(forest.insert(&comment("c2", "drop-1", Some("c1"))));
        assert!(forest.insert(&comment("c3", "drop-1", Some("c2"))));

        assert_eq!(forest.roots().len(), 1);
        let top = &forest.roots()[0];
        assert_eq!(top.replies.len(), 1);
        assert_eq!(top.replies[0].replies[0].id, "c3");
    }

    #[test]
    fn test_comment_reply_rejects_foreign_drop() {
        let mut forest = CommentForest::default();
        assert!(forest.insert(&comment("c1", "drop-1", None)));
        // Reply whose drop does not match its parent's drop never attaches.
        assert!(!forest.insert(&comment("c2", "drop-2", Some("c1"))));
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_comment_remove_subtree_takes_replies() {
        let mut forest = CommentForest::default();
        forest.insert(&comment("c1", "drop-1", None));
        forest.insert(&comment("c2", "drop-1", Some("c1")));
        forest.insert(&comment("c3", "drop-1", Some("c2")));
        forest.insert(&comment("c4", "drop-1", None));

        let removed = forest.remove_subtree("c1").unwrap();
        assert_eq!(removed.replies[0].id, "c2");
        assert!(!forest.contains("c2"));
        assert!(!forest.contains("c3"));
        assert_eq!(forest.flatten().len(), 1);
    }
}
