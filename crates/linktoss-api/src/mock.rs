//! In-memory fake of the LinkToss backend for tests.
//!
//! Implements [`Transport`] over mutable in-memory tables with the same
//! observable semantics as the real backend: soft-delete flags excluded
//! from every read, the deck delete cascade (descendant decks and the
//! drops reached through them), the comment reply cascade, owner-only
//! comment mutation, and bearer-token auth with an expirable access token
//! so the 401 → refresh → retry path can be exercised deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linktoss_common::ApiResult;
use serde_json::{Value, json};

use crate::contracts::{
    CommentCreate, CommentUpdate, DeckCreate, DeckUpdate, DropCreate, DropUpdate,
    SocialLoginRequest, UserProfileUpdate,
};
use crate::transport::{ApiRequest, RawResponse, Transport};

#[derive(Debug, Clone)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    phone_number: Option<String>,
    profile_image: Option<String>,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DeckRow {
    id: String,
    name: String,
    description: Option<String>,
    color_hex: Option<String>,
    parent: Option<String>,
    order: i32,
    is_public: bool,
    deleted: bool,
    seq: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DropRow {
    id: String,
    title: String,
    content: Option<String>,
    url: String,
    memo: Option<String>,
    deck: String,
    tags: Vec<String>,
    deleted: bool,
    seq: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: String,
    content: String,
    user: i64,
    user_name: String,
    drop: String,
    parent: Option<String>,
    deleted: bool,
    seq: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<UserRow>,
    decks: Vec<DeckRow>,
    drops: Vec<DropRow>,
    comments: Vec<CommentRow>,
    access_tokens: HashMap<String, i64>,
    refresh_tokens: HashMap<String, i64>,
    expired_access: HashSet<String>,
    refresh_disabled: bool,
    token_counter: u64,
    seq: u64,
    request_log: Vec<String>,
}

/// In-memory backend double, injectable wherever a [`Transport`] goes.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Create an empty backend. Tests log in before touching content.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark every currently-valid access token as expired, so the next
    /// authenticated request answers 401. Refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        let mut state = self.lock();
        let tokens: Vec<String> = state.access_tokens.keys().cloned().collect();
        state.expired_access.extend(tokens);
    }

    /// Make every subsequent refresh attempt fail with 401.
    pub fn disable_refresh(&self) {
        self.lock().refresh_disabled = true;
    }

    /// Requests seen so far, as `"METHOD /path/"` strings.
    #[must_use]
    pub fn request_log(&self) -> Vec<String> {
        self.lock().request_log.clone()
    }

    /// Forget recorded requests.
    pub fn clear_request_log(&self) {
        self.lock().request_log.clear();
    }
}

// ==================== Response helpers ====================

fn reply(status: u16, body: Value) -> RawResponse {
    RawResponse {
        status,
        body: body.to_string(),
    }
}

fn ok(body: Value) -> RawResponse {
    reply(200, body)
}

fn created(body: Value) -> RawResponse {
    reply(201, body)
}

fn no_content() -> RawResponse {
    RawResponse {
        status: 204,
        body: String::new(),
    }
}

fn bad_request(detail: &str) -> RawResponse {
    reply(400, json!({ "detail": detail }))
}

fn unauthorized(detail: &str) -> RawResponse {
    reply(401, json!({ "detail": detail }))
}

fn forbidden(detail: &str) -> RawResponse {
    reply(403, json!({ "detail": detail }))
}

fn not_found(detail: &str) -> RawResponse {
    reply(404, json!({ "detail": detail }))
}

fn query_value<'a>(request: &'a ApiRequest, key: &str) -> Option<&'a str> {
    request
        .query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_body<T: serde::de::DeserializeOwned>(request: &ApiRequest) -> Result<T, RawResponse> {
    let body = request
        .body
        .clone()
        .ok_or_else(|| bad_request("request body required"))?;
    serde_json::from_value(body).map_err(|_| bad_request("malformed request body"))
}

// ==================== State queries ====================

impl MockState {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn mint_tokens(&mut self, user_id: i64) -> (String, String) {
        self.token_counter += 1;
        let access = format!("access-{}", self.token_counter);
        let refresh = format!("refresh-{}", self.token_counter);
        self.access_tokens.insert(access.clone(), user_id);
        self.refresh_tokens.insert(refresh.clone(), user_id);
        (access, refresh)
    }

    fn authenticate(&self, bearer: Option<&str>) -> Result<i64, RawResponse> {
        let token = bearer.ok_or_else(|| unauthorized("authentication required"))?;
        if self.expired_access.contains(token) {
            return Err(unauthorized("token expired"));
        }
        self.access_tokens
            .get(token)
            .copied()
            .ok_or_else(|| unauthorized("invalid token"))
    }

    fn deck(&self, id: &str) -> Option<&DeckRow> {
        self.decks.iter().find(|d| d.id == id && !d.deleted)
    }

    fn drop_row(&self, id: &str) -> Option<&DropRow> {
        self.drops.iter().find(|d| d.id == id && !d.deleted)
    }

    fn comment(&self, id: &str) -> Option<&CommentRow> {
        self.comments.iter().find(|c| c.id == id && !c.deleted)
    }

    fn deck_depth(&self, deck: &DeckRow) -> i32 {
        let mut depth = 0;
        let mut current = deck.parent.as_deref();
        while let Some(parent_id) = current {
            depth += 1;
            current = self.deck(parent_id).and_then(|d| d.parent.as_deref());
        }
        depth
    }

    /// Whether making `candidate` the parent of `deck_id` would create a cycle.
    fn would_cycle(&self, deck_id: &str, candidate: &str) -> bool {
        let mut current = Some(candidate.to_string());
        while let Some(id) = current {
            if id == deck_id {
                return true;
            }
            current = self.deck(&id).and_then(|d| d.parent.clone());
        }
        false
    }

    fn sorted_children(&self, parent: Option<&str>) -> Vec<&DeckRow> {
        let mut children: Vec<&DeckRow> = self
            .decks
            .iter()
            .filter(|d| !d.deleted && d.parent.as_deref() == parent)
            .collect();
        children.sort_by_key(|d| (d.order, d.seq));
        children
    }

    fn descendant_deck_ids(&self, root: &str) -> HashSet<String> {
        let mut collected = HashSet::new();
        collected.insert(root.to_string());
        let mut frontier = vec![root.to_string()];
        while let Some(id) = frontier.pop() {
            for child in self.sorted_children(Some(&id)) {
                if collected.insert(child.id.clone()) {
                    frontier.push(child.id.clone());
                }
            }
        }
        collected
    }

    fn deck_json(&self, deck: &DeckRow) -> Value {
        json!({
            "id": deck.id,
            "name": deck.name,
            "description": deck.description,
            "color_hex": deck.color_hex,
            "parent": deck.parent,
            "order": deck.order,
            "is_public": deck.is_public,
            "depth": self.deck_depth(deck),
            "children_count": self.sorted_children(Some(&deck.id)).len(),
            "created_at": deck.created_at.to_rfc3339(),
            "updated_at": deck.updated_at.to_rfc3339(),
        })
    }

    fn deck_tree_json(&self, deck: &DeckRow) -> Value {
        let children: Vec<Value> = self
            .sorted_children(Some(&deck.id))
            .into_iter()
            .map(|child| self.deck_tree_json(child))
            .collect();
        json!({
            "id": deck.id,
            "name": deck.name,
            "description": deck.description,
            "color_hex": deck.color_hex,
            "order": deck.order,
            "is_public": deck.is_public,
            "depth": self.deck_depth(deck),
            "children": children,
            "created_at": deck.created_at.to_rfc3339(),
            "updated_at": deck.updated_at.to_rfc3339(),
        })
    }

    fn drop_json(&self, drop: &DropRow) -> Value {
        json!({
            "id": drop.id,
            "title": drop.title,
            "content": drop.content,
            "url": drop.url,
            "memo": drop.memo,
            "deck": drop.deck,
            "tags": drop.tags,
            "created_at": drop.created_at.to_rfc3339(),
            "updated_at": drop.updated_at.to_rfc3339(),
        })
    }

    fn comment_json(&self, comment: &CommentRow) -> Value {
        let replies_count = self
            .comments
            .iter()
            .filter(|c| !c.deleted && c.parent.as_deref() == Some(&comment.id))
            .count();
        json!({
            "id": comment.id,
            "content": comment.content,
            "user": comment.user,
            "user_name": comment.user_name,
            "drop": comment.drop,
            "parent": comment.parent,
            "replies_count": replies_count,
            "created_at": comment.created_at.to_rfc3339(),
            "updated_at": comment.updated_at.to_rfc3339(),
        })
    }

    fn comment_tree_json(&self, comment: &CommentRow) -> Value {
        let mut replies: Vec<&CommentRow> = self
            .comments
            .iter()
            .filter(|c| !c.deleted && c.parent.as_deref() == Some(&comment.id))
            .collect();
        replies.sort_by_key(|c| c.seq);
        let replies: Vec<Value> = replies
            .into_iter()
            .map(|reply| self.comment_tree_json(reply))
            .collect();
        json!({
            "id": comment.id,
            "content": comment.content,
            "user": comment.user,
            "user_name": comment.user_name,
            "drop": comment.drop,
            "parent": comment.parent,
            "replies": replies,
            "created_at": comment.created_at.to_rfc3339(),
            "updated_at": comment.updated_at.to_rfc3339(),
        })
    }

    fn user_json(&self, user: &UserRow) -> Value {
        json!({
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "phone_number": user.phone_number,
            "profile_image": user.profile_image,
            "provider": user.provider,
            "created_at": user.created_at.to_rfc3339(),
            "updated_at": user.updated_at.to_rfc3339(),
        })
    }
}

// ==================== Routing ====================

impl MockBackend {
    #[allow(clippy::too_many_lines)]
    fn route(&self, request: &ApiRequest, bearer: Option<&str>) -> RawResponse {
        let mut state = self.lock();
        state
            .request_log
            .push(format!("{} {}", request.method, request.path));

        let segments: Vec<&str> = request
            .path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (request.method.as_str(), segments.as_slice()) {
            // ---- auth-free endpoints ----
            ("POST", ["users", "refresh"]) => Self::refresh(&mut state, request),
            ("POST", ["users", provider, "login"]) => {
                Self::login(&mut state, request, provider)
            }

            // ---- decks ----
            ("GET", ["decks"]) => {
                Self::authed(&state, bearer, |state, _| Self::decks_list(state, request))
            }
            ("POST", ["decks"]) => match state.authenticate(bearer) {
                Ok(user) => Self::decks_create(&mut state, request, user),
                Err(resp) => resp,
            },
            ("GET", ["decks", "tree"]) => {
                Self::authed(&state, bearer, |state, _| Self::decks_tree(state, request))
            }
            ("GET", ["decks", id]) => {
                Self::authed(&state, bearer, |state, _| Self::deck_read(state, id))
            }
            ("PUT", ["decks", id]) => match state.authenticate(bearer) {
                Ok(_) => Self::deck_update(&mut state, request, id),
                Err(resp) => resp,
            },
            ("DELETE", ["decks", id]) => match state.authenticate(bearer) {
                Ok(_) => Self::deck_delete(&mut state, id),
                Err(resp) => resp,
            },

            // ---- comments (before the /drops/{id}/ catch-all) ----
            ("GET", ["drops", "comments"]) => Self::authed(&state, bearer, |state, _| {
                Self::comments_list(state, request)
            }),
            ("POST", ["drops", "comments"]) => match state.authenticate(bearer) {
                Ok(user) => Self::comment_create(&mut state, request, user),
                Err(resp) => resp,
            },
            ("GET", ["drops", "comments", "tree"]) => {
                Self::authed(&state, bearer, |state, _| {
                    Self::comments_tree(state, request)
                })
            }
            ("GET", ["drops", "comments", id]) => {
                Self::authed(&state, bearer, |state, _| Self::comment_read(state, id))
            }
            ("PUT", ["drops", "comments", id]) => match state.authenticate(bearer) {
                Ok(user) => Self::comment_update(&mut state, request, id, user),
                Err(resp) => resp,
            },
            ("DELETE", ["drops", "comments", id]) => match state.authenticate(bearer) {
                Ok(user) => Self::comment_delete(&mut state, id, user),
                Err(resp) => resp,
            },
            ("GET", ["drops", "comments", id, "replies"]) => {
                Self::authed(&state, bearer, |state, _| Self::comment_replies(state, id))
            }

            // ---- drops ----
            ("GET", ["drops"]) => {
                Self::authed(&state, bearer, |state, _| Self::drops_list(state, request))
            }
            ("POST", ["drops"]) => match state.authenticate(bearer) {
                Ok(_) => Self::drop_create(&mut state, request),
                Err(resp) => resp,
            },
            ("GET", ["drops", "search"]) => {
                Self::authed(&state, bearer, |state, _| Self::drops_search(state, request))
            }
            ("GET", ["drops", id]) => {
                Self::authed(&state, bearer, |state, _| Self::drop_read(state, id))
            }
            ("PUT", ["drops", id]) => match state.authenticate(bearer) {
                Ok(_) => Self::drop_update(&mut state, request, id),
                Err(resp) => resp,
            },
            ("DELETE", ["drops", id]) => match state.authenticate(bearer) {
                Ok(_) => Self::drop_delete(&mut state, id),
                Err(resp) => resp,
            },

            // ---- users ----
            ("GET", ["users", "profile", "me"]) => {
                Self::authed(&state, bearer, Self::user_me)
            }
            ("PATCH", ["users", "profile", "me", "update"]) => {
                match state.authenticate(bearer) {
                    Ok(user) => Self::user_update(&mut state, request, user),
                    Err(resp) => resp,
                }
            }
            ("DELETE", ["users", "withdraw"]) => match state.authenticate(bearer) {
                Ok(user) => Self::user_withdraw(&mut state, user),
                Err(resp) => resp,
            },

            _ => not_found("no such endpoint"),
        }
    }

    fn authed(
        state: &MockState,
        bearer: Option<&str>,
        handler: impl FnOnce(&MockState, i64) -> RawResponse,
    ) -> RawResponse {
        match state.authenticate(bearer) {
            Ok(user) => handler(state, user),
            Err(resp) => resp,
        }
    }

    // ---- auth handlers ----

    fn login(state: &mut MockState, request: &ApiRequest, provider: &str) -> RawResponse {
        let input: SocialLoginRequest = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        let Some(identity) = input.id_token.or(input.identifier) else {
            return bad_request("id_token or identifier required");
        };

        let user_id = if let Some(user) = state.users.iter().find(|u| u.username == identity) {
            user.id
        } else {
            let id = state.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
            let now = Utc::now();
            state.users.push(UserRow {
                id,
                username: identity,
                email: None,
                phone_number: None,
                profile_image: None,
                provider: provider.to_string(),
                created_at: now,
                updated_at: now,
            });
            id
        };

        let (access, refresh) = state.mint_tokens(user_id);
        ok(json!({
            "user_id": user_id,
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
        }))
    }

    fn refresh(state: &mut MockState, request: &ApiRequest) -> RawResponse {
        if state.refresh_disabled {
            return unauthorized("refresh token expired");
        }
        let Some(token) = request
            .body
            .as_ref()
            .and_then(|b| b.get("refresh_token"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
        else {
            return bad_request("refresh_token required");
        };
        let Some(user_id) = state.refresh_tokens.remove(&token) else {
            return unauthorized("invalid refresh token");
        };
        let (access, refresh) = state.mint_tokens(user_id);
        ok(json!({
            "user_id": user_id,
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
        }))
    }

    // ---- deck handlers ----

    fn decks_list(state: &MockState, request: &ApiRequest) -> RawResponse {
        let parent = query_value(request, "parent");
        let decks: Vec<Value> = state
            .sorted_children(parent)
            .into_iter()
            .map(|deck| state.deck_json(deck))
            .collect();
        ok(Value::Array(decks))
    }

    fn decks_create(state: &mut MockState, request: &ApiRequest, _user: i64) -> RawResponse {
        let input: DeckCreate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        if input.name.is_empty() || input.name.len() > 255 {
            return bad_request("name must be between 1 and 255 characters");
        }
        if let Some(ref parent_id) = input.parent
            && state.deck(parent_id).is_none()
        {
            return bad_request("parent deck not found");
        }

        let order = state.sorted_children(input.parent.as_deref()).len() as i32;
        let now = Utc::now();
        let seq = state.next_seq();
        let row = DeckRow {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            color_hex: input.color_hex,
            parent: input.parent,
            order,
            is_public: input.is_public,
            deleted: false,
            seq,
            created_at: now,
            updated_at: now,
        };
        let body = state.deck_json(&row);
        state.decks.push(row);
        created(body)
    }

    fn decks_tree(state: &MockState, request: &ApiRequest) -> RawResponse {
        let roots: Vec<Value> = match query_value(request, "deck_id") {
            Some(id) => match state.deck(id) {
                Some(deck) => vec![state.deck_tree_json(deck)],
                None => return not_found("deck not found"),
            },
            None => state
                .sorted_children(None)
                .into_iter()
                .map(|deck| state.deck_tree_json(deck))
                .collect(),
        };
        ok(Value::Array(roots))
    }

    fn deck_read(state: &MockState, id: &str) -> RawResponse {
        state
            .deck(id)
            .map_or_else(|| not_found("deck not found"), |deck| ok(state.deck_json(deck)))
    }

    fn deck_update(state: &mut MockState, request: &ApiRequest, id: &str) -> RawResponse {
        let input: DeckUpdate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        if state.deck(id).is_none() {
            return not_found("deck not found");
        }
        if let Some(Some(ref new_parent)) = input.parent {
            if state.deck(new_parent).is_none() {
                return bad_request("parent deck not found");
            }
            if state.would_cycle(id, new_parent) {
                return bad_request("deck cannot be its own ancestor");
            }
        }

        let Some(row) = state.decks.iter_mut().find(|d| d.id == id && !d.deleted) else {
            return not_found("deck not found");
        };
        if let Some(name) = input.name {
            if name.is_empty() || name.len() > 255 {
                return bad_request("name must be between 1 and 255 characters");
            }
            row.name = name;
        }
        if let Some(description) = input.description {
            row.description = description;
        }
        if let Some(color_hex) = input.color_hex {
            row.color_hex = Some(color_hex);
        }
        if let Some(parent) = input.parent {
            row.parent = parent;
        }
        if let Some(order) = input.order {
            row.order = order;
        }
        if let Some(is_public) = input.is_public {
            row.is_public = is_public;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        ok(state.deck_json(&row))
    }

    /// Soft-delete a deck, every descendant deck, every drop reached
    /// through them, and the comments on those drops.
    fn deck_delete(state: &mut MockState, id: &str) -> RawResponse {
        if state.deck(id).is_none() {
            return not_found("deck not found");
        }
        let doomed_decks = state.descendant_deck_ids(id);
        let mut doomed_drops = HashSet::new();
        for drop in &mut state.drops {
            if !drop.deleted && doomed_decks.contains(&drop.deck) {
                drop.deleted = true;
                doomed_drops.insert(drop.id.clone());
            }
        }
        for comment in &mut state.comments {
            if !comment.deleted && doomed_drops.contains(&comment.drop) {
                comment.deleted = true;
            }
        }
        for deck in &mut state.decks {
            if doomed_decks.contains(&deck.id) {
                deck.deleted = true;
            }
        }
        no_content()
    }

    // ---- drop handlers ----

    fn drops_list(state: &MockState, request: &ApiRequest) -> RawResponse {
        let Some(deck_id) = query_value(request, "deck_id") else {
            return bad_request("deck_id required");
        };
        let mut drops: Vec<&DropRow> = state
            .drops
            .iter()
            .filter(|d| !d.deleted && d.deck == deck_id)
            .collect();
        drops.sort_by_key(|d| d.seq);
        let drops: Vec<Value> = drops.into_iter().map(|d| state.drop_json(d)).collect();
        ok(Value::Array(drops))
    }

    fn drop_create(state: &mut MockState, request: &ApiRequest) -> RawResponse {
        let input: DropCreate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        if input.title.is_empty() || input.title.len() > 255 {
            return bad_request("title must be between 1 and 255 characters");
        }
        if input.url.is_empty() || input.url.len() > 200 {
            return bad_request("url must be between 1 and 200 characters");
        }
        if state.deck(&input.deck).is_none() {
            return bad_request("deck not found");
        }

        let now = Utc::now();
        let seq = state.next_seq();
        let row = DropRow {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title,
            content: input.content,
            url: input.url,
            memo: input.memo,
            deck: input.deck,
            tags: input.tags,
            deleted: false,
            seq,
            created_at: now,
            updated_at: now,
        };
        let body = state.drop_json(&row);
        state.drops.push(row);
        created(body)
    }

    fn drops_search(state: &MockState, request: &ApiRequest) -> RawResponse {
        let query = query_value(request, "query").unwrap_or_default().to_lowercase();
        let tags: Vec<String> = query_value(request, "tags")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        let mut hits: Vec<&DropRow> = state
            .drops
            .iter()
            .filter(|d| !d.deleted)
            .filter(|d| {
                query.is_empty()
                    || d.title.to_lowercase().contains(&query)
                    || d.content
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&query))
                    || d.memo
                        .as_deref()
                        .is_some_and(|m| m.to_lowercase().contains(&query))
            })
            .filter(|d| tags.iter().all(|tag| d.tags.contains(tag)))
            .collect();
        hits.sort_by_key(|d| d.seq);
        let hits: Vec<Value> = hits.into_iter().map(|d| state.drop_json(d)).collect();
        ok(Value::Array(hits))
    }

    fn drop_read(state: &MockState, id: &str) -> RawResponse {
        state
            .drop_row(id)
            .map_or_else(|| not_found("drop not found"), |drop| ok(state.drop_json(drop)))
    }

    fn drop_update(state: &mut MockState, request: &ApiRequest, id: &str) -> RawResponse {
        let input: DropUpdate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        if let Some(ref deck_id) = input.deck
            && state.deck(deck_id).is_none()
        {
            return bad_request("deck not found");
        }
        let Some(row) = state.drops.iter_mut().find(|d| d.id == id && !d.deleted) else {
            return not_found("drop not found");
        };
        if let Some(title) = input.title {
            if title.is_empty() || title.len() > 255 {
                return bad_request("title must be between 1 and 255 characters");
            }
            row.title = title;
        }
        if let Some(url) = input.url {
            if url.is_empty() || url.len() > 200 {
                return bad_request("url must be between 1 and 200 characters");
            }
            row.url = url;
        }
        if let Some(content) = input.content {
            row.content = content;
        }
        if let Some(memo) = input.memo {
            row.memo = memo;
        }
        if let Some(deck) = input.deck {
            row.deck = deck;
        }
        if let Some(tags) = input.tags {
            row.tags = tags;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        ok(state.drop_json(&row))
    }

    fn drop_delete(state: &mut MockState, id: &str) -> RawResponse {
        let Some(row) = state.drops.iter_mut().find(|d| d.id == id && !d.deleted) else {
            return not_found("drop not found");
        };
        row.deleted = true;
        let drop_id = row.id.clone();
        for comment in &mut state.comments {
            if comment.drop == drop_id {
                comment.deleted = true;
            }
        }
        no_content()
    }

    // ---- comment handlers ----

    fn comments_list(state: &MockState, request: &ApiRequest) -> RawResponse {
        let Some(drop_id) = query_value(request, "drop_id") else {
            return bad_request("drop_id required");
        };
        let mut comments: Vec<&CommentRow> = state
            .comments
            .iter()
            .filter(|c| !c.deleted && c.drop == drop_id && c.parent.is_none())
            .collect();
        comments.sort_by_key(|c| c.seq);
        let comments: Vec<Value> = comments.into_iter().map(|c| state.comment_json(c)).collect();
        ok(Value::Array(comments))
    }

    fn comment_create(state: &mut MockState, request: &ApiRequest, user: i64) -> RawResponse {
        let input: CommentCreate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        if input.content.trim().is_empty() {
            return bad_request("content must not be empty");
        }
        if state.drop_row(&input.drop).is_none() {
            return bad_request("drop not found");
        }
        if let Some(ref parent_id) = input.parent {
            let Some(parent) = state.comment(parent_id) else {
                return bad_request("parent comment not found");
            };
            // A reply must annotate the same drop as its parent.
            if parent.drop != input.drop {
                return bad_request("parent comment belongs to a different drop");
            }
        }

        let user_name = state
            .users
            .iter()
            .find(|u| u.id == user)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let now = Utc::now();
        let seq = state.next_seq();
        let row = CommentRow {
            id: uuid::Uuid::new_v4().to_string(),
            content: input.content,
            user,
            user_name,
            drop: input.drop,
            parent: input.parent,
            deleted: false,
            seq,
            created_at: now,
            updated_at: now,
        };
        let body = state.comment_json(&row);
        state.comments.push(row);
        created(body)
    }

    fn comments_tree(state: &MockState, request: &ApiRequest) -> RawResponse {
        let Some(drop_id) = query_value(request, "drop_id") else {
            return bad_request("drop_id required");
        };
        let mut roots: Vec<&CommentRow> = state
            .comments
            .iter()
            .filter(|c| !c.deleted && c.drop == drop_id && c.parent.is_none())
            .collect();
        roots.sort_by_key(|c| c.seq);
        let roots: Vec<Value> = roots
            .into_iter()
            .map(|c| state.comment_tree_json(c))
            .collect();
        ok(Value::Array(roots))
    }

    fn comment_read(state: &MockState, id: &str) -> RawResponse {
        state.comment(id).map_or_else(
            || not_found("comment not found"),
            |comment| ok(state.comment_json(comment)),
        )
    }

    fn comment_update(
        state: &mut MockState,
        request: &ApiRequest,
        id: &str,
        user: i64,
    ) -> RawResponse {
        let input: CommentUpdate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        if input.content.trim().is_empty() {
            return bad_request("content must not be empty");
        }
        let Some(owner) = state.comment(id).map(|c| c.user) else {
            return not_found("comment not found");
        };
        if owner != user {
            return forbidden("not the comment owner");
        }
        let Some(row) = state.comments.iter_mut().find(|c| c.id == id && !c.deleted) else {
            return not_found("comment not found");
        };
        row.content = input.content;
        row.updated_at = Utc::now();
        let row = row.clone();
        ok(state.comment_json(&row))
    }

    /// Soft-delete a comment and its entire reply subtree.
    fn comment_delete(state: &mut MockState, id: &str, user: i64) -> RawResponse {
        let Some(owner) = state.comment(id).map(|c| c.user) else {
            return not_found("comment not found");
        };
        if owner != user {
            return forbidden("not the comment owner");
        }

        let mut doomed = HashSet::new();
        doomed.insert(id.to_string());
        let mut frontier = vec![id.to_string()];
        while let Some(current) = frontier.pop() {
            for comment in &state.comments {
                if !comment.deleted
                    && comment.parent.as_deref() == Some(&current)
                    && doomed.insert(comment.id.clone())
                {
                    frontier.push(comment.id.clone());
                }
            }
        }
        for comment in &mut state.comments {
            if doomed.contains(&comment.id) {
                comment.deleted = true;
            }
        }
        no_content()
    }

    fn comment_replies(state: &MockState, id: &str) -> RawResponse {
        if state.comment(id).is_none() {
            return not_found("comment not found");
        }
        let mut replies: Vec<&CommentRow> = state
            .comments
            .iter()
            .filter(|c| !c.deleted && c.parent.as_deref() == Some(id))
            .collect();
        replies.sort_by_key(|c| c.seq);
        let replies: Vec<Value> = replies.into_iter().map(|c| state.comment_json(c)).collect();
        ok(Value::Array(replies))
    }

    // ---- user handlers ----

    fn user_me(state: &MockState, user: i64) -> RawResponse {
        state
            .users
            .iter()
            .find(|u| u.id == user)
            .map_or_else(|| not_found("user not found"), |u| ok(state.user_json(u)))
    }

    fn user_update(state: &mut MockState, request: &ApiRequest, user: i64) -> RawResponse {
        let input: UserProfileUpdate = match parse_body(request) {
            Ok(input) => input,
            Err(resp) => return resp,
        };
        let Some(row) = state.users.iter_mut().find(|u| u.id == user) else {
            return not_found("user not found");
        };
        if let Some(username) = input.username {
            row.username = username;
        }
        if let Some(email) = input.email {
            row.email = Some(email);
        }
        if let Some(phone_number) = input.phone_number {
            row.phone_number = Some(phone_number);
        }
        if let Some(profile_image) = input.profile_image {
            row.profile_image = Some(profile_image);
        }
        row.updated_at = Utc::now();
        let row = row.clone();
        ok(state.user_json(&row))
    }

    fn user_withdraw(state: &mut MockState, user: i64) -> RawResponse {
        state.users.retain(|u| u.id != user);
        state.access_tokens.retain(|_, owner| *owner != user);
        state.refresh_tokens.retain(|_, owner| *owner != user);
        ok(json!({ "message": "account deleted" }))
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> ApiResult<RawResponse> {
        Ok(self.route(request, bearer))
    }
}
