//! Form validation for posts, comments and accounts.
//!
//! Forms take the raw submitted strings and either produce cleaned values or
//! a set of field errors to show next to the inputs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Group, User};

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Field name to messages. Serializes as a map for templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Cleaned post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl PostForm {
    /// Validate a submitted post. `group` must be empty or the id of one of `groups`.
    pub fn validate(
        text: &str,
        group: &str,
        image: &str,
        groups: &[Group],
    ) -> Result<PostForm, FormErrors> {
        let mut errors = FormErrors::new();

        let text = text.trim();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let group = group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            match group.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            }
        };

        let image = Some(image.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        errors.into_result(PostForm {
            text: text.to_owned(),
            group_id,
            image,
        })
    }
}

/// Cleaned comment form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(text: &str) -> Result<CommentForm, FormErrors> {
        let mut errors = FormErrors::new();
        let text = text.trim();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }
        errors.into_result(CommentForm {
            text: text.to_owned(),
        })
    }
}

/// Cleaned signup form. Username uniqueness is checked against the store by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<SignupForm, FormErrors> {
        let mut errors = FormErrors::new();

        let username = username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if !User::is_valid_username(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if password.is_empty() {
            errors.add("password", REQUIRED);
        } else if password.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
            );
        }
        if password != password_confirm {
            errors.add("password_confirm", "The two password fields didn't match.");
        }

        errors.into_result(SignupForm {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        let mut group = Group::new("группа0", "test_slug0", "проверка описания0");
        group.id = 4;
        vec![group]
    }

    #[test]
    fn test_post_form_valid_without_group() {
        let form = PostForm::validate("  Тестовый текст ", "", "", &groups()).unwrap();
        assert_eq!(form.text, "Тестовый текст");
        assert_eq!(form.group_id, None);
        assert_eq!(form.image, None);
    }

    #[test]
    fn test_post_form_valid_with_group_and_image() {
        let form = PostForm::validate("text", "4", "posts/small.gif", &groups()).unwrap();
        assert_eq!(form.group_id, Some(4));
        assert_eq!(form.image.as_deref(), Some("posts/small.gif"));
    }

    #[test]
    fn test_post_form_requires_text() {
        let errors = PostForm::validate("   ", "", "", &groups()).unwrap_err();
        assert_eq!(errors.get("text"), [REQUIRED.to_string()]);
        assert!(!errors.contains("group"));
    }

    #[test]
    fn test_post_form_rejects_unknown_group() {
        let errors = PostForm::validate("text", "99", "", &groups()).unwrap_err();
        assert!(errors.contains("group"));

        let errors = PostForm::validate("text", "not-a-number", "", &groups()).unwrap_err();
        assert!(errors.contains("group"));
    }

    #[test]
    fn test_comment_form() {
        assert_eq!(CommentForm::validate(" hi ").unwrap().text, "hi");
        assert!(CommentForm::validate("").unwrap_err().contains("text"));
    }

    #[test]
    fn test_signup_form() {
        assert!(SignupForm::validate("leo", "war-and-peace", "war-and-peace").is_ok());

        let errors = SignupForm::validate("bad name", "short", "other").unwrap_err();
        assert!(errors.contains("username"));
        assert!(errors.contains("password"));
        assert!(errors.contains("password_confirm"));
    }

    #[test]
    fn test_errors_display() {
        let mut errors = FormErrors::new();
        errors.add("text", "required");
        errors.add("group", "invalid");
        assert_eq!(errors.to_string(), "group: invalid; text: required");
    }
}
