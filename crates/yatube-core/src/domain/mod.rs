//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentDetails};
pub use follow::Follow;
pub use group::{Group, TITLE_MAX_LEN};
pub use post::{Post, PostDetails};
pub use user::User;

/// Identifier of an entity that has not been persisted yet.
///
/// Repositories assign the real id on insert.
pub const UNSAVED_ID: i64 = 0;
