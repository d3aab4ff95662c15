// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact submission validator.
//!
//! Deliberately permissive: required fields must be present and non-empty,
//! and the email must look like `local@domain.tld`. Values are checked as
//! submitted, without trimming or case folding.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Contact form body as received. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide name, email, and message")]
    MissingFields,

    #[error("Please provide a valid email address")]
    InvalidEmail,
}

impl ValidationError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

/// Check whether `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Validate a raw contact request.
pub fn validate(request: ContactRequest) -> Result<ContactSubmission, ValidationError> {
    let (Some(name), Some(email), Some(message)) = (
        non_empty(request.name),
        non_empty(request.email),
        non_empty(request.message),
    ) else {
        debug!("Missing required contact fields");
        return Err(ValidationError::MissingFields);
    };

    if !is_valid_email(&email) {
        debug!(email = %email, "Email failed shape check");
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ContactSubmission {
        name,
        email,
        message,
        subject: non_empty(request.subject),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            subject: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let submission = validate(request("Alice", "alice@example.com", "Hi")).unwrap();
        assert_eq!(submission.name, "Alice");
        assert_eq!(submission.subject, None);
    }

    #[test]
    fn test_missing_fields() {
        for req in [
            request("", "alice@example.com", "Hi"),
            request("Alice", "", "Hi"),
            request("Alice", "alice@example.com", ""),
            ContactRequest::default(),
            ContactRequest {
                name: Some("Alice".into()),
                email: Some("alice@example.com".into()),
                ..Default::default()
            },
        ] {
            assert_eq!(validate(req).unwrap_err(), ValidationError::MissingFields);
        }
    }

    #[test]
    fn test_missing_fields_checked_before_email_shape() {
        let err = validate(request("", "not-an-email", "Hi")).unwrap_err();
        assert_eq!(err.code(), "missing_fields");
    }

    #[test]
    fn test_email_shapes() {
        for bad in ["not-an-email", "a@b", "@b.com", "a b@c.com", "a@b@c.com", "a@.com"] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
        for good in ["a@b.co", "alice@example.com", "first.last+tag@sub.example.org"] {
            assert!(is_valid_email(good), "{good} should be accepted");
        }
    }

    #[test]
    fn test_invalid_email_code() {
        let err = validate(request("Alice", "a@b", "Hi")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail);
        assert_eq!(err.code(), "invalid_email");
    }

    #[test]
    fn test_no_normalization() {
        // Whitespace-only values are non-empty and pass through untouched.
        let submission = validate(request(" ", "Alice@Example.COM", "  hi  ")).unwrap();
        assert_eq!(submission.name, " ");
        assert_eq!(submission.email, "Alice@Example.COM");
        assert_eq!(submission.message, "  hi  ");

        // Surrounding whitespace in the email is not trimmed away.
        assert!(validate(request("Alice", " alice@example.com", "Hi")).is_err());
    }

    #[test]
    fn test_empty_subject_is_absent() {
        let mut req = request("Alice", "alice@example.com", "Hi");
        req.subject = Some(String::new());
        assert_eq!(validate(req).unwrap().subject, None);
    }
}
