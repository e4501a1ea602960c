//! Content tree management for the LinkToss client.
//!
//! Owns the Deck/Drop/Comment hierarchy on this side of the wire:
//!
//! - **Tree projections**: [`DeckForest`] and [`CommentForest`], built
//!   once per fetch and adjusted by id-keyed insert/remove after each
//!   confirmed mutation, never optimistically
//! - **Services**: [`DeckService`], [`DropService`], [`CommentService`]
//!   and [`UserService`], which validate inputs client-side, call the API
//!   layer, and keep caller-held forests consistent
//!
//! Every entity moves through a single lifecycle transition, `Active →
//! SoftDeleted`, which is terminal: a successful delete removes the node
//! (and, for decks and comments, its whole subtree) from every later read.

pub mod services;
pub mod tree;

pub use services::{CommentService, DeckService, DropService, UserService};
pub use tree::{CommentForest, DeckForest};
