use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UNSAVED_ID, User};

/// Comment entity - a reply left under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            post_id,
            author_id,
            text: text.into(),
            created: Utc::now(),
        }
    }
}

/// A comment joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentDetails {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: User,
}
