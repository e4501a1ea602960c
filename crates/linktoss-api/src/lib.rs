//! Typed client for the LinkToss REST API.
//!
//! This crate owns everything that touches the wire:
//!
//! - **Contracts**: serde DTOs mirroring the backend JSON
//! - **Transport**: the [`Transport`] seam with the production
//!   [`HttpTransport`] built on reqwest
//! - **Session**: the access/refresh token pair via [`Session`]
//! - **Client**: [`ApiClient`], which attaches bearer tokens and applies
//!   the one-shot refresh-and-retry policy on 401 responses
//! - **Endpoints**: one typed group per resource ([`DecksApi`],
//!   [`DropsApi`], [`CommentsApi`], [`UsersApi`])
//!
//! With the `test-utils` feature, [`MockBackend`] provides an in-memory
//! stand-in for the backend with faithful soft-delete cascade semantics.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use linktoss_api::{ApiClient, DecksApi, HttpTransport};
//! use linktoss_common::{ApiResult, Config};
//!
//! async fn example() -> ApiResult<()> {
//!     let config = Config::for_base_url("http://localhost:8000");
//!     let client = Arc::new(ApiClient::new(Arc::new(HttpTransport::new(&config)?)));
//!     let decks = DecksApi::new(client);
//!     let roots = decks.list(None).await?;
//!     println!("{} root decks", roots.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod contracts;
pub mod endpoints;
#[cfg(feature = "test-utils")]
pub mod mock;
pub mod session;
pub mod transport;

pub use client::ApiClient;
pub use endpoints::{CommentsApi, DecksApi, DropsApi, UsersApi};
#[cfg(feature = "test-utils")]
pub use mock::MockBackend;
pub use session::{Session, TokenPair};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};
