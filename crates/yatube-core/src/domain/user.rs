use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UNSAVED_ID;

/// Longest username accepted at signup.
pub const USERNAME_MAX_LEN: usize = 150;

/// User entity - an account that can author posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Create a new, unsaved user.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            username: username.into(),
            password_hash: password_hash.into(),
            date_joined: Utc::now(),
        }
    }

    /// Usernames are letters, digits and `@.+-_`, at most 150 characters.
    pub fn is_valid_username(username: &str) -> bool {
        !username.is_empty()
            && username.chars().count() <= USERNAME_MAX_LEN
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(User::is_valid_username("Test_User"));
        assert!(User::is_valid_username("leo.tolstoy+blog@ya"));
        assert!(User::is_valid_username("Лев"));
        assert!(!User::is_valid_username(""));
        assert!(!User::is_valid_username("two words"));
        assert!(!User::is_valid_username("slash/name"));
        assert!(!User::is_valid_username(&"a".repeat(USERNAME_MAX_LEN + 1)));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("author", "$argon2id$secret");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "author");
    }
}
