//! Contact form submission subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed body (JSON or form)
//!     → Submission (all fields optional)
//!     → sanitize.rs (strip markup, normalise whitespace, in place)
//!     → validate.rs (aggregate per-field failures)
//!     → [rate limiter, security subsystem]
//!     → sink.rs (downstream acceptance)
//! ```
//!
//! # Design Decisions
//! - Sanitization never rejects; only validation does
//! - Validation reads sanitized values but re-checks for script markers
//! - A submission lives for one request and is never persisted

pub mod sanitize;
pub mod sink;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use sanitize::sanitize_submission;
pub use sink::{LoggingSink, SinkError, SubmissionSink};
pub use validate::{validate_submission, FieldErrors, ValidationResult};

/// A single contact form submission.
///
/// Every field is optional at parse time. Required-ness is enforced by the
/// validator so that all missing fields can be reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Submission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Names of the submission fields, used as keys in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Message => "message",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_json() {
        let sub: Submission =
            serde_json::from_str(r#"{"name":"Ab","message":"hello there"}"#).unwrap();
        assert_eq!(sub.name.as_deref(), Some("Ab"));
        assert!(sub.email.is_none());
        assert!(sub.phone.is_none());
    }

    #[test]
    fn test_field_serializes_lowercase() {
        let json = serde_json::to_string(&Field::Message).unwrap();
        assert_eq!(json, "\"message\"");
        assert_eq!(Field::Phone.to_string(), "phone");
    }
}
