//! Request-level error taxonomy.
//!
//! Each gate produces its own variant so it can carry a distinct status and
//! body. Only failures nobody anticipated become `Internal`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::http::response::{
    ApiResponse, MSG_BODY_TOO_LARGE, MSG_CORS_VIOLATION, MSG_INTERNAL, MSG_INVALID_BODY, MSG_NOT_FOUND,
    MSG_VALIDATION_FAILED,
};
use crate::security::RateLimitSnapshot;
use crate::submission::FieldErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Origin header not in the allowed set.
    #[error("origin not allowed: {0}")]
    OriginRejected(String),

    /// Body could not be parsed as JSON or form data.
    #[error("malformed body: {0}")]
    MalformedBody(String),

    #[error("request body too large")]
    PayloadTooLarge,

    /// One or more fields failed validation.
    #[error("validation failed for {} field(s)", .0.len())]
    ValidationFailed(FieldErrors),

    /// Client exhausted its window.
    #[error("rate limit exceeded")]
    RateLimitExceeded {
        snapshot: RateLimitSnapshot,
        message: String,
    },

    #[error("route not found")]
    NotFound,

    /// Anything else. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::OriginRejected(_) => StatusCode::FORBIDDEN,
            ApiError::MalformedBody(_) | ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::OriginRejected(_) => {
                (status, Json(ApiResponse::failure(MSG_CORS_VIOLATION))).into_response()
            }
            ApiError::MalformedBody(_) => {
                (status, Json(ApiResponse::failure(MSG_INVALID_BODY))).into_response()
            }
            ApiError::PayloadTooLarge => {
                (status, Json(ApiResponse::failure(MSG_BODY_TOO_LARGE))).into_response()
            }
            ApiError::ValidationFailed(errors) => (
                status,
                Json(ApiResponse::failure(MSG_VALIDATION_FAILED).with_errors(errors)),
            )
                .into_response(),
            ApiError::RateLimitExceeded { snapshot, message } => {
                let mut response = (status, Json(ApiResponse::failure(message))).into_response();
                snapshot.apply_headers(response.headers_mut());
                response
            }
            ApiError::NotFound => {
                (status, Json(ApiResponse::failure(MSG_NOT_FOUND))).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Unhandled error");
                (status, Json(ApiResponse::failure(MSG_INTERNAL))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_cors_rejection_is_403() {
        let response = ApiError::OriginRejected("https://evil.test".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "CORS policy violation");
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let response = ApiError::Internal("smtp password wrong".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");
        assert!(!json.to_string().contains("smtp"));
    }

    #[tokio::test]
    async fn test_rate_limit_carries_headers() {
        let snapshot = RateLimitSnapshot {
            admitted: false,
            limit: 5,
            remaining: 0,
            window: Duration::from_secs(900),
            reset_after: Duration::from_secs(120),
        };
        let response = ApiError::RateLimitExceeded {
            snapshot,
            message: "slow down".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "120");
        assert_eq!(response.headers()["ratelimit-remaining"], "0");
        assert_eq!(body_json(response).await["message"], "slow down");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MalformedBody("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ValidationFailed(FieldErrors::default()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
