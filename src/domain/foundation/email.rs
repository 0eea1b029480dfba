//! Participant email value object.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// A participant's email address.
///
/// Equality is exact-string: `User@Example.com` and `user@example.com`
/// are different participants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a validated email.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the value is empty
    /// - `InvalidFormat` if it is not shaped like `local@domain.tld`
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !EMAIL_PATTERN.is_match(&value) {
            return Err(ValidationError::invalid_format(
                "email",
                "Invalid email format",
            ));
        }
        Ok(Self(value))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_addresses() {
        for value in [
            "user@example.com",
            "test.user@example.com",
            "user+tag@example.co.uk",
            "user_name@example.org",
            "user123@test-domain.com",
        ] {
            let email = Email::new(value).unwrap();
            assert_eq!(email.as_str(), value);
        }
    }

    #[test]
    fn rejects_invalid_addresses() {
        for value in [
            "invalid-email",
            "user@",
            "@example.com",
            "user @example.com",
            "user@example",
            "user@@example.com",
            "user@.com",
        ] {
            assert!(
                matches!(Email::new(value), Err(ValidationError::InvalidFormat { .. })),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn rejects_empty_address() {
        assert_eq!(
            Email::new(""),
            Err(ValidationError::empty_field("email"))
        );
    }

    #[test]
    fn error_message_mentions_format() {
        let err = Email::new("invalid").unwrap_err();
        assert!(err.to_string().contains("Invalid email format"));
    }

    #[test]
    fn equality_is_case_sensitive() {
        let upper = Email::new("User@Example.com").unwrap();
        let lower = Email::new("user@example.com").unwrap();
        assert_ne!(upper, lower);
        assert_eq!(lower, Email::new("user@example.com").unwrap());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Email, _> = serde_json::from_str("\"a@x.com\"");
        assert!(ok.is_ok());

        let bad: Result<Email, _> = serde_json::from_str("\"not-an-email\"");
        assert!(bad.is_err());
    }
}
