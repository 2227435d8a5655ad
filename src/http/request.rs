//! Request handling and extraction.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Parse the submission body as JSON or form data
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Content type decides the decoder. A body that is neither JSON nor form
//!   data is ignored and read as an empty submission, so validation reports
//!   every missing field
//! - Body size limit enforced by the extractors (413)

use axum::extract::{FromRequest, Request};
use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use axum::{Form, Json};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::ApiError;
use crate::submission::Submission;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// A submission decoded from either `application/json` or
/// `application/x-www-form-urlencoded`.
#[derive(Debug, Clone)]
pub struct SubmissionBody(pub Submission);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(request: &Request) -> BodyKind {
    let Some(content_type) = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return BodyKind::Other;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

fn body_error(status: StatusCode, detail: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedBody(detail)
    }
}

impl<S> FromRequest<S> for SubmissionBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Form => Form::<Submission>::from_request(req, state)
                .await
                .map(|Form(sub)| SubmissionBody(sub))
                .map_err(|e| body_error(e.status(), e.body_text())),
            BodyKind::Json => Json::<Submission>::from_request(req, state)
                .await
                .map(|Json(sub)| SubmissionBody(sub))
                .map_err(|e| body_error(e.status(), e.body_text())),
            BodyKind::Other => Ok(SubmissionBody(Submission::default())),
        }
    }
}
