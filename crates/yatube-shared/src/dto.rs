//! Data Transfer Objects - form bodies and query strings.
//!
//! Every field defaults to empty so a partial submission still deserializes
//! and can be reported back to the user field by field.

use serde::{Deserialize, Serialize};

/// `?page=` query of the paginated listings. Kept raw; the paginator clamps it.
///
/// Read from the raw key/value pairs so a repeated key never fails the
/// request: the last `page` wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct PageQuery {
    pub page: Option<String>,
}

impl From<Vec<(String, String)>> for PageQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            page: last_value(pairs, "page"),
        }
    }
}

/// Body of the post create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFormData {
    pub text: String,
    /// Group id, or empty for no group.
    pub group: String,
    /// Path or URL of an image, or empty.
    pub image: String,
}

/// Body of the comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentFormData {
    pub text: String,
}

/// Body of the login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
    pub next: String,
}

/// Body of the signup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupFormData {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// `?next=` query of the login page. The last `next` wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct NextQuery {
    pub next: Option<String>,
}

impl From<Vec<(String, String)>> for NextQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            next: last_value(pairs, "next"),
        }
    }
}

fn last_value(pairs: Vec<(String, String)>, key: &str) -> Option<String> {
    pairs
        .into_iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_page_key_keeps_last_value() {
        let query: PageQuery =
            serde_json::from_str(r#"[["page", "2"], ["sort", "new"], ["page", "1"]]"#).unwrap();
        assert_eq!(query.page.as_deref(), Some("1"));

        let empty: PageQuery = serde_json::from_str("[]").unwrap();
        assert_eq!(empty.page, None);
    }

    #[test]
    fn test_next_query_ignores_other_keys() {
        let query: NextQuery =
            serde_json::from_str(r#"[["next", "/create/"], ["page", "3"]]"#).unwrap();
        assert_eq!(query.next.as_deref(), Some("/create/"));
    }
}
