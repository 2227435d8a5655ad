//! JSON response envelope.
//!
//! # Responsibilities
//! - Shape every API reply as `{success, message, errors?}`
//! - Keep client-facing messages in one place
//!
//! # Design Decisions
//! - `errors` is omitted entirely unless validation failed
//! - Internal detail never appears in a message

use serde::Serialize;

use crate::submission::FieldErrors;

pub const MSG_ACCEPTED: &str = "Thank you for your message! We will get back to you soon.";
pub const MSG_VALIDATION_FAILED: &str = "Validation failed";
pub const MSG_INVALID_BODY: &str = "Invalid request body";
pub const MSG_BODY_TOO_LARGE: &str = "Request body too large";
pub const MSG_CORS_VIOLATION: &str = "CORS policy violation";
pub const MSG_NOT_FOUND: &str = "Route not found";
pub const MSG_INTERNAL: &str = "Internal server error";

/// Body of every contact API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub environment: String,
}
