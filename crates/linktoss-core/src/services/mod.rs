//! Services for the content tree and the surrounding account plumbing.

mod comment;
mod deck;
mod drop;
mod user;

pub use comment::CommentService;
pub use deck::DeckService;
pub use drop::DropService;
pub use user::UserService;
