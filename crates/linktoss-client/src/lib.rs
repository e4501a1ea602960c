//! LinkToss client SDK entry point.
//!
//! Wires configuration → transport → request client → services and hands
//! back one [`LinkToss`] handle carrying a service per resource. All
//! services share a single [`Session`], so a login through
//! [`LinkToss::users`] authenticates every subsequent request, and a
//! failed token refresh logs the whole handle out at once.
//!
//! # Example
//!
//! ```no_run
//! use linktoss_client::{LinkToss, Provider};
//!
//! async fn example() -> linktoss_client::ApiResult<()> {
//!     let linktoss = LinkToss::from_env()?;
//!     linktoss.users.login(Provider::Google, "firebase-id-token").await?;
//!
//!     let forest = linktoss.decks.load_tree(None).await?;
//!     for deck in forest.flatten() {
//!         println!("{}{}", "  ".repeat(deck.depth as usize), deck.name);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use linktoss_api::{
    ApiClient, CommentsApi, DecksApi, DropsApi, HttpTransport, Session, Transport, UsersApi,
};
use linktoss_core::{CommentService, DeckService, DropService, UserService};

pub use linktoss_api::contracts::{
    Comment, CommentCreate, CommentTree, CommentUpdate, Deck, DeckCreate, DeckTree, DeckUpdate,
    Drop, DropCreate, DropUpdate, MessageResponse, Provider, Token, User, UserProfileUpdate,
};
pub use linktoss_common::{ApiError, ApiResult, Config};
pub use linktoss_core::{CommentForest, DeckForest};

/// The assembled LinkToss client: one service per resource over a shared
/// session.
#[derive(Clone)]
pub struct LinkToss {
    client: Arc<ApiClient>,
    /// Deck hierarchy operations.
    pub decks: DeckService,
    /// Saved-link operations and search.
    pub drops: DropService,
    /// Threaded comment operations.
    pub comments: CommentService,
    /// Authentication and profile operations.
    pub users: UserService,
}

impl LinkToss {
    /// Connect to the backend named by the configuration.
    pub fn connect(config: &Config) -> ApiResult<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        tracing::info!(base_url = %config.api.base_url, "Connecting to LinkToss backend");
        Ok(Self::with_transport(transport))
    }

    /// Connect using `.env` / `config/*.toml` / `LINKTOSS__*` settings.
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok();
        let config = Config::load()?;
        Self::connect(&config)
    }

    /// Assemble the client over an explicit transport.
    ///
    /// This is the composition root: everything downstream of the
    /// transport (session, request client, endpoint groups, services)
    /// is built here and nowhere else.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        let client = Arc::new(ApiClient::new(transport));

        let decks = DeckService::new(DecksApi::new(Arc::clone(&client)));
        let drops = DropService::new(DropsApi::new(Arc::clone(&client)));
        let comments = CommentService::new(CommentsApi::new(Arc::clone(&client)));
        let users = UserService::new(
            UsersApi::new(Arc::clone(&client)),
            Arc::clone(client.session()),
        );

        Self {
            client,
            decks,
            drops,
            comments,
            users,
        }
    }

    /// The session shared by every service of this handle.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }
}
