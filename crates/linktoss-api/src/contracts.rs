//! Wire contracts for the LinkToss REST API.
//!
//! Field names and optionality mirror the backend's JSON exactly; these
//! types are the only place the wire format appears. Tags are always
//! `Vec<String>` on this side of the boundary; the backend historically
//! serves them either as an array or as a comma-joined string, and the
//! custom deserializer folds both into the canonical form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

// ==================== Decks ====================

/// A folder of drops. Forms a forest via `parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,

    /// Display name, 1-255 characters.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Hex color, e.g. `#ff8800`.
    #[serde(default)]
    pub color_hex: Option<String>,

    /// Parent deck ID (null for root decks).
    #[serde(default)]
    pub parent: Option<String>,

    /// Sibling ordering hint.
    #[serde(default)]
    pub order: i32,

    #[serde(default)]
    pub is_public: bool,

    /// 0 for root decks, parent depth + 1 otherwise.
    #[serde(default)]
    pub depth: i32,

    /// Count of direct children.
    #[serde(default)]
    pub children_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /decks/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DeckCreate {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 7))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default)]
    pub is_public: bool,
}

/// Payload for `PUT /decks/{id}/`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DeckUpdate {
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// None = no change, Some(None) = clear, Some(Some(text)) = set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,

    #[validate(length(min = 1, max = 7))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,

    /// None = no change, Some(None) = move to root, Some(Some(id)) = reparent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// A deck with its recursive children, from `GET /decks/tree/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckTree {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub color_hex: Option<String>,

    #[serde(default)]
    pub order: i32,

    #[serde(default)]
    pub is_public: bool,

    #[serde(default)]
    pub depth: i32,

    #[serde(default)]
    pub children: Vec<DeckTree>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Deck> for DeckTree {
    fn from(deck: Deck) -> Self {
        Self {
            id: deck.id,
            name: deck.name,
            description: deck.description,
            color_hex: deck.color_hex,
            order: deck.order,
            is_public: deck.is_public,
            depth: deck.depth,
            children: Vec::new(),
            created_at: deck.created_at,
            updated_at: deck.updated_at,
        }
    }
}

// ==================== Drops ====================

/// A saved link. Always belongs to exactly one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    pub id: String,

    /// Display title, 1-255 characters.
    pub title: String,

    #[serde(default)]
    pub content: Option<String>,

    /// Saved URL, up to 200 characters.
    pub url: String,

    #[serde(default)]
    pub memo: Option<String>,

    /// Owning deck ID.
    pub deck: String,

    /// Free-form tags, display order preserved.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /drops/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DropCreate {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Owning deck ID.
    pub deck: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Payload for `PUT /drops/{id}/`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DropUpdate {
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// None = no change, Some(None) = clear, Some(Some(text)) = set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Option<String>>,

    #[validate(length(min = 1, max = 200))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// None = no change, Some(None) = clear, Some(Some(text)) = set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<Option<String>>,

    /// Move the drop to another deck.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

// ==================== Comments ====================

/// A comment on a drop, optionally threaded under a parent comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,

    pub content: String,

    /// Author user ID.
    pub user: i64,

    /// Denormalized author display name.
    #[serde(default)]
    pub user_name: String,

    /// Drop this comment annotates.
    pub drop: String,

    /// Parent comment ID for threaded replies.
    #[serde(default)]
    pub parent: Option<String>,

    /// Count of direct replies.
    #[serde(default)]
    pub replies_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /drops/comments/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentCreate {
    /// Drop to comment on.
    pub drop: String,

    #[validate(length(min = 1))]
    pub content: String,

    /// Parent comment for a threaded reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Payload for `PUT /drops/comments/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentUpdate {
    #[validate(length(min = 1))]
    pub content: String,
}

/// A comment with its recursive replies, from `GET /drops/comments/tree/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentTree {
    pub id: String,
    pub content: String,
    pub user: i64,

    #[serde(default)]
    pub user_name: String,

    pub drop: String,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub replies: Vec<CommentTree>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentTree {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user: comment.user,
            user_name: comment.user_name,
            drop: comment.drop,
            parent: comment.parent,
            replies: Vec::new(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

// ==================== Users & Auth ====================

/// Social login provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Kakao,
    Google,
    Apple,
    /// Identifier/password login handled by the backend itself.
    Native,
}

impl Provider {
    /// The path segment used in `POST /users/{provider}/login/`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kakao => "kakao",
            Self::Google => "google",
            Self::Apple => "apple",
            Self::Native => "native",
        }
    }
}

/// A LinkToss user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub profile_image: Option<String>,

    #[serde(default)]
    pub provider: Option<Provider>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for `PATCH /users/profile/me/update/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserProfileUpdate {
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[validate(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 20))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// Access/refresh token pair issued by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Payload for `POST /users/refresh/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub refresh_token: String,
}

/// Payload for `POST /users/{provider}/login/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLoginRequest {
    /// User identifier (native login).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Password (native login).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Provider-issued ID token (social login).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl SocialLoginRequest {
    /// Social login with a provider-issued ID token.
    #[must_use]
    pub fn from_id_token(id_token: impl Into<String>) -> Self {
        Self {
            id_token: Some(id_token.into()),
            ..Self::default()
        }
    }

    /// Native identifier/password login.
    #[must_use]
    pub fn native(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }
}

/// Generic message envelope used by withdraw and other terminal endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Helpers ====================

/// Accept tags as either an array or a legacy comma-joined string.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsRepr {
        List(Vec<String>),
        Joined(String),
    }

    match Option::<TagsRepr>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(TagsRepr::List(tags)) => Ok(tags),
        Some(TagsRepr::Joined(joined)) => Ok(joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(ToOwned::to_owned)
            .collect()),
    }
}
