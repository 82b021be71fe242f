use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Group, UNSAVED_ID, User};

/// Number of characters shown when a post is displayed as a title.
const EXCERPT_LEN: usize = 15;

/// Post entity - a text entry with an optional image and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// Set once when the post is created and never changed afterwards.
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl Post {
    /// Create a new, unsaved post.
    pub fn new(
        author_id: i64,
        text: impl Into<String>,
        group_id: Option<i64>,
        image: Option<String>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            text: text.into(),
            pub_date: Utc::now(),
            author_id,
            group_id,
            image,
        }
    }

    /// Only the author may edit a post.
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }

    /// Apply an edit. Author and publication date stay untouched.
    pub fn revise(&mut self, text: impl Into<String>, group_id: Option<i64>, image: Option<String>) {
        self.text = text.into();
        self.group_id = group_id;
        self.image = image;
    }

    /// The first characters of the text, used for page titles.
    pub fn excerpt(&self) -> String {
        self.text.chars().take(EXCERPT_LEN).collect()
    }
}

/// A post joined with its author and group, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_counts_characters() {
        let post = Post::new(1, "Тестовый текст поста длиннее пятнадцати", None, None);
        assert_eq!(post.excerpt(), "Тестовый текст ");

        let short = Post::new(1, "short", None, None);
        assert_eq!(short.excerpt(), "short");
    }

    #[test]
    fn test_revise_keeps_author_and_date() {
        let mut post = Post::new(7, "before", Some(3), None);
        let pub_date = post.pub_date;

        post.revise("after", None, Some("posts/cat.gif".to_string()));

        assert_eq!(post.text, "after");
        assert_eq!(post.group_id, None);
        assert_eq!(post.image.as_deref(), Some("posts/cat.gif"));
        assert_eq!(post.author_id, 7);
        assert_eq!(post.pub_date, pub_date);
        assert!(post.is_authored_by(7));
        assert!(!post.is_authored_by(8));
    }

    #[test]
    fn test_details_serialize_flat() {
        let author = User::new("author", "hash");
        let details = PostDetails {
            post: Post::new(author.id, "hello", None, None),
            author,
            group: None,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["author"]["username"], "author");
        assert!(json["group"].is_null());
    }
}
