//! Input normalization shared by registration, login and profile updates.

use regex::Regex;

/// Usernames are unique case-insensitively, so they are stored lowercased.
pub(crate) fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Emails are only trimmed; uniqueness is case-sensitive.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Trimmed value, or `None` when the input is missing or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
