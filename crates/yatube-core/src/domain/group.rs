use serde::{Deserialize, Serialize};

use super::UNSAVED_ID;

/// Longest group title.
pub const TITLE_MAX_LEN: usize = 200;

/// Group entity - a named community posts may optionally belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    /// Unique, URL-safe identifier used in `/group/<slug>/`.
    pub slug: String,
    pub description: String,
}

impl Group {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            title: title.into(),
            slug: slug.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}
