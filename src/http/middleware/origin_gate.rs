//! Origin gate middleware.
//!
//! Translates an [`OriginDecision`] into status codes and CORS headers.
//! Runs outside body limits and handlers, so a rejected origin never reaches
//! the rate limiter.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::observability::metrics;
use crate::security::{OriginDecision, OriginPolicy};

const HEALTH_ALLOW_METHODS: &str = "GET, OPTIONS";
const HEALTH_ALLOW_HEADERS: &str = "Content-Type";
const STANDARD_ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const STANDARD_ALLOW_HEADERS: &str = "Content-Type,Authorization";

pub async fn origin_gate(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    // Lossy so a non-UTF-8 origin is rejected instead of passing as absent.
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let decision = policy.evaluate(request.uri().path(), request.method(), origin.as_deref());

    match decision {
        OriginDecision::HealthBypass { preflight: true } => {
            let mut response = StatusCode::NO_CONTENT.into_response();
            apply_health_headers(response.headers_mut());
            response
        }
        OriginDecision::HealthBypass { preflight: false } => {
            let mut response = next.run(request).await;
            apply_health_headers(response.headers_mut());
            response
        }
        OriginDecision::Admitted {
            origin,
            preflight: true,
        } => {
            let mut response = StatusCode::NO_CONTENT.into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(STANDARD_ALLOW_METHODS),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(STANDARD_ALLOW_HEADERS),
            );
            if let Some(origin) = origin {
                apply_origin_headers(headers, &origin);
            }
            response
        }
        OriginDecision::Admitted {
            origin,
            preflight: false,
        } => {
            let mut response = next.run(request).await;
            if let Some(origin) = origin {
                apply_origin_headers(response.headers_mut(), &origin);
            }
            response
        }
        OriginDecision::Rejected { origin } => {
            tracing::warn!(
                origin = %origin,
                path = %request.uri().path(),
                method = %request.method(),
                "Origin rejected"
            );
            metrics::record_cors_rejection();
            ApiError::OriginRejected(origin).into_response()
        }
    }
}

fn apply_health_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(HEALTH_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(HEALTH_ALLOW_HEADERS),
    );
}

fn apply_origin_headers(headers: &mut HeaderMap, origin: &str) {
    // Admitted origins came from config and always parse; skip otherwise.
    let Ok(value) = HeaderValue::from_str(origin) else {
        return;
    };
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}
