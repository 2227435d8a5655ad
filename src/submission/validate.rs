//! Field validation.
//!
//! # Rules
//! | Field   | Rule |
//! |---------|------|
//! | name    | required, 2..=100 chars after trimming |
//! | email   | required, at most 255 chars, `local@domain.tld` shape |
//! | phone   | optional, `+`, digits, spaces, dashes, parentheses, one digit minimum |
//! | message | required, 10..=5000 chars, no script markers or event handlers |
//!
//! Every rule runs; failures are aggregated so the client sees all of them.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::submission::sanitize::contains_event_handler;
use crate::submission::{Field, Submission};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 5000;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("phone pattern"));

static SCRIPT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script").expect("script marker pattern"));

/// Per-field failure reasons, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, reason: impl Into<String>) {
        self.0.insert(field, reason.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn check_name(value: &Option<String>) -> Option<String> {
    let Some(name) = present(value) else {
        return Some("Name is required".to_string());
    };
    let len = name.trim().chars().count();
    if len < NAME_MIN_CHARS {
        Some(format!("Name is too short (minimum {NAME_MIN_CHARS} characters)"))
    } else if len > NAME_MAX_CHARS {
        Some(format!("Name is too long (maximum {NAME_MAX_CHARS} characters)"))
    } else {
        None
    }
}

fn check_email(value: &Option<String>) -> Option<String> {
    let Some(email) = present(value) else {
        return Some("Email is required".to_string());
    };
    if email.chars().count() > EMAIL_MAX_CHARS {
        Some(format!("Email must be at most {EMAIL_MAX_CHARS} characters"))
    } else if !EMAIL_SHAPE.is_match(email) {
        Some("Please provide a valid email address".to_string())
    } else {
        None
    }
}

fn check_phone(value: &Option<String>) -> Option<String> {
    let phone = value.as_deref().unwrap_or_default();
    if phone.is_empty() {
        return None;
    }
    if PHONE_SHAPE.is_match(phone) && phone.chars().any(|c| c.is_ascii_digit()) {
        None
    } else {
        Some("Please provide a valid phone number".to_string())
    }
}

fn check_message(value: &Option<String>) -> Option<String> {
    let Some(message) = present(value) else {
        return Some("Message is required".to_string());
    };
    let len = message.chars().count();
    if len < MESSAGE_MIN_CHARS {
        Some(format!(
            "Message is too short (minimum {MESSAGE_MIN_CHARS} characters)"
        ))
    } else if len > MESSAGE_MAX_CHARS {
        Some(format!(
            "Message is too long (maximum {MESSAGE_MAX_CHARS} characters)"
        ))
    } else if SCRIPT_MARKER.is_match(message) || contains_event_handler(message) {
        Some("Message contains disallowed content".to_string())
    } else {
        None
    }
}

/// Validate a (sanitized) submission.
pub fn validate_submission(submission: &Submission) -> ValidationResult {
    let mut errors = FieldErrors::default();
    let checks = [
        (Field::Name, check_name(&submission.name)),
        (Field::Email, check_email(&submission.email)),
        (Field::Phone, check_phone(&submission.phone)),
        (Field::Message, check_message(&submission.message)),
    ];
    for (field, failure) in checks {
        if let Some(reason) = failure {
            errors.insert(field, reason);
        }
    }

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}
