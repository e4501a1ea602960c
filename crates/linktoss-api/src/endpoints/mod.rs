//! Typed endpoint groups, one per backend resource.

mod comments;
mod decks;
mod drops;
mod users;

pub use comments::CommentsApi;
pub use decks::DecksApi;
pub use drops::DropsApi;
pub use users::UsersApi;
