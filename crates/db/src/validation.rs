//! Field validation shared by the admin API and the contact form.
//!
//! SQLite stores statuses as plain text, so the allowed values are enforced
//! here rather than with CHECK constraints.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Validation errors for user-supplied content
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid message status: '{0}'. Valid values: new, read")]
    InvalidMessageStatus(String),

    #[error("Invalid project status: '{0}'. Valid values: ongoing, completed")]
    InvalidProjectStatus(String),

    #[error("{field} too short")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be a valid email address")]
    InvalidEmail { field: &'static str },
}

impl ValidationError {
    /// The field the error refers to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::InvalidMessageStatus(_) => Some("status"),
            ValidationError::InvalidProjectStatus(_) => Some("status"),
            ValidationError::TooShort { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidEmail { field } => Some(field),
        }
    }
}

/// Valid contact message statuses
pub const VALID_MESSAGE_STATUSES: &[&str] = &["new", "read"];

/// Valid project statuses
pub const VALID_PROJECT_STATUSES: &[&str] = &["ongoing", "completed"];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Loose address check: something@something.tld with no whitespace.
///
/// # Examples
/// ```
/// use db::validation::is_valid_email;
///
/// assert!(is_valid_email("hello@example.org"));
/// assert!(!is_valid_email("not an email"));
/// ```
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail { field })
    }
}

/// Require at least `min` characters once surrounding whitespace is removed.
pub fn require_min_len(
    field: &'static str,
    value: &str,
    min: usize,
) -> Result<(), ValidationError> {
    if value.trim().chars().count() >= min {
        Ok(())
    } else {
        Err(ValidationError::TooShort { field, min })
    }
}

pub fn require_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(ValidationError::Negative { field })
    }
}

pub fn require_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@c.d"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_min_len_ignores_surrounding_whitespace() {
        assert!(require_min_len("Name", "Al", 2).is_ok());
        assert_eq!(
            require_min_len("Name", "  A  ", 2),
            Err(ValidationError::TooShort {
                field: "Name",
                min: 2
            })
        );
    }

    #[test]
    fn test_min_len_counts_characters_not_bytes() {
        assert!(require_min_len("Name", "Ánh", 3).is_ok());
    }

    #[test]
    fn test_headline_message() {
        let err = require_min_len("Headline", "Hi", 3).unwrap_err();
        assert_eq!(err.to_string(), "Headline too short");
        assert_eq!(err.field(), Some("Headline"));
    }

    #[test]
    fn test_range() {
        assert!(require_range("progress", 0, 0, 100).is_ok());
        assert!(require_range("progress", 100, 0, 100).is_ok());
        assert!(require_range("progress", 101, 0, 100).is_err());
        assert!(require_non_negative("countries", -1).is_err());
    }
}
