//! Data models for the hackathon API.
//!
//! Request bodies are validated at the boundary and turned into the `New*`
//! domain structs the repository persists.

mod invitation;
mod member;
mod team;

pub use invitation::*;
pub use member::*;
pub use team::*;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;

/// Upper bound for names, roles and emails.
pub const MAX_TEXT_LEN: usize = 100;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone pattern is valid"));

/// Trim a required text field and check its length.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => require_text(field, v, max).map(Some),
    }
}

/// Validate and normalize an email address (trimmed, lowercased).
pub fn validate_email(field: &str, value: &str) -> Result<String, AppError> {
    let email = require_text(field, value, MAX_TEXT_LEN)?.to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::Validation(format!(
            "{} is not a valid email address",
            field
        )));
    }
    Ok(email)
}

/// Validate an E.164 phone number and normalize it to `+<digits>`.
/// Spaces, dashes, dots and parentheses are ignored.
pub fn validate_phone(value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    if !PHONE_RE.is_match(&compact) {
        return Err(AppError::Validation(
            "phone must be in E.164 format (e.g. +14155550123)".to_string(),
        ));
    }
    Ok(Some(normalize_phone(&compact)))
}

/// Keep only the digits of a phone number and prefix `+`.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("+{}", digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Ada  ", 10).unwrap(), "Ada");
    }

    #[test]
    fn test_require_text_rejects_blank_and_long() {
        assert!(require_text("name", "   ", 10).is_err());
        assert!(require_text("name", &"x".repeat(11), 10).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("role", None, 10).unwrap(), None);
        assert_eq!(optional_text("role", Some("  "), 10).unwrap(), None);
        assert_eq!(
            optional_text("role", Some(" Designer "), 10).unwrap(),
            Some("Designer".to_string())
        );
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("email", " Bob@Example.com ").unwrap(),
            "bob@example.com"
        );
        assert!(validate_email("email", "bob").is_err());
        assert!(validate_email("email", "bob@example").is_err());
        assert!(validate_email("email", "bob smith@example.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("")).unwrap(), None);
        assert_eq!(
            validate_phone(Some("+919876543210")).unwrap(),
            Some("+919876543210".to_string())
        );
        assert_eq!(
            validate_phone(Some("14155550123")).unwrap(),
            Some("+14155550123".to_string())
        );
        assert!(validate_phone(Some("+0123")).is_err());
        assert_eq!(
            validate_phone(Some("+1 (415) 555-0123")).unwrap(),
            Some("+14155550123".to_string())
        );
        assert!(validate_phone(Some("call me")).is_err());
        assert!(validate_phone(Some("+1234567890123456")).is_err());
    }
}
