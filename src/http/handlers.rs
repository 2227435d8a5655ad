//! Route handlers.
//!
//! # Contact Pipeline
//! ```text
//! body parsed → sanitize (in place) → validate → rate limit → sink → 200
//!                                        │            │         │
//!                                       400          429       500
//! ```
//! The rate limiter only counts submissions that passed validation.

use std::time::Instant;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};

use crate::error::ApiError;
use crate::http::request::SubmissionBody;
use crate::http::response::{ApiResponse, HealthStatus, MSG_ACCEPTED};
use crate::http::server::AppState;
use crate::observability::metrics::{self, SubmissionOutcome};
use crate::security::{RateLimitKey, RateLimitSnapshot};
use crate::submission::{sanitize_submission, validate_submission, Submission, ValidationResult};

pub const CONTACT_PATH: &str = "/api/contact";

/// `POST /api/contact`
pub async fn contact(
    State(state): State<AppState>,
    key: RateLimitKey,
    body: Result<SubmissionBody, ApiError>,
) -> Response {
    let start = Instant::now();

    let result = match body {
        Ok(SubmissionBody(submission)) => process(&state, &key, submission).await,
        Err(e) => {
            tracing::info!(client = %key, error = %e, "Rejected submission body");
            Err(e)
        }
    };

    match result {
        Ok(snapshot) => {
            metrics::record_submission(SubmissionOutcome::Accepted, start);
            let mut response = Json(ApiResponse::ok(MSG_ACCEPTED)).into_response();
            snapshot.apply_headers(response.headers_mut());
            response
        }
        Err(e) => {
            metrics::record_submission(outcome_of(&e), start);
            e.into_response()
        }
    }
}

async fn process(
    state: &AppState,
    key: &RateLimitKey,
    mut submission: Submission,
) -> Result<RateLimitSnapshot, ApiError> {
    sanitize_submission(&mut submission);

    if let ValidationResult::Invalid(errors) = validate_submission(&submission) {
        let fields: Vec<&str> = errors.fields().map(|f| f.as_str()).collect();
        tracing::info!(client = %key, fields = ?fields, "Submission failed validation");
        return Err(ApiError::ValidationFailed(errors));
    }

    let snapshot = state.limiter.check(key);
    if !snapshot.admitted {
        tracing::warn!(
            client = %key,
            reset_secs = snapshot.reset_secs(),
            "Submission rate limited"
        );
        metrics::record_rate_limited();
        return Err(ApiError::RateLimitExceeded {
            snapshot,
            message: state.limiter.retry_message(),
        });
    }

    state
        .sink
        .accept(&submission)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(snapshot)
}

fn outcome_of(error: &ApiError) -> SubmissionOutcome {
    match error {
        ApiError::MalformedBody(_) | ApiError::PayloadTooLarge => SubmissionOutcome::MalformedBody,
        ApiError::ValidationFailed(_) => SubmissionOutcome::Invalid,
        ApiError::RateLimitExceeded { .. } => SubmissionOutcome::RateLimited,
        _ => SubmissionOutcome::SinkFailed,
    }
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: state.environment.to_string(),
    })
}

/// Fallback for unknown routes and unsupported methods.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
