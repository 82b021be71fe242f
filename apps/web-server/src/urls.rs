//! Link building and redirect targets.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const LOGIN_URL: &str = "/auth/login/";

/// Everything but unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// As `SEGMENT`, keeping `/` readable in `?next=`.
const NEXT_VALUE: &AsciiSet = &SEGMENT.remove(b'/');

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, SEGMENT))
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

/// Login page that sends the user back to `next` afterwards.
pub fn login(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", utf8_percent_encode(next, NEXT_VALUE))
}

/// Only same-site absolute paths are followed after login.
pub fn is_local(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_keeps_slashes() {
        assert_eq!(login("/create/"), "/auth/login/?next=/create/");
        assert_eq!(login("/follow/?page=2"), "/auth/login/?next=/follow/%3Fpage%3D2");
    }

    #[test]
    fn test_profile_escapes_username() {
        assert_eq!(profile("leo"), "/profile/leo/");
        assert_eq!(profile("leo+blog@ya"), "/profile/leo%2Bblog%40ya/");
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("/"));
        assert!(is_local("/posts/1/edit/"));
        assert!(!is_local(""));
        assert!(!is_local("https://evil.example/"));
        assert!(!is_local("//evil.example/"));
        assert!(!is_local("/\\evil.example/"));
    }
}
