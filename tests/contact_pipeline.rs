//! End-to-end tests over a real listener.

use std::sync::Arc;
use std::time::Duration;

use contact_gate::security::RateLimitKey;
use reqwest::StatusCode;

mod common;

use common::{start_server, valid_submission, FailingSink, RecordingSink, ALLOWED_ORIGIN};

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn test_name_length_boundary() {
    let sink = Arc::new(RecordingSink::default());
    let server = start_server(sink.clone()).await;

    let ok = client()
        .post(server.url("/api/contact"))
        .json(&valid_submission("Ab"))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body: serde_json::Value = ok.json().await.unwrap();
    assert_eq!(body["success"], true);

    let short = client()
        .post(server.url("/api/contact"))
        .json(&valid_submission("A"))
        .send()
        .await
        .unwrap();
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = short.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["name"].is_string());

    assert_eq!(sink.accepted().len(), 1);
    server.stop().await;
}

#[tokio::test]
async fn test_sink_receives_sanitized_submission() {
    let sink = Arc::new(RecordingSink::default());
    let server = start_server(sink.clone()).await;

    let response = client()
        .post(server.url("/api/contact"))
        .json(&serde_json::json!({
            "name": "<b>Jane</b>   Doe",
            "email": "  Jane@Example.COM ",
            "message": "Hi <script>alert(1)</script>there, please call me back."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accepted = sink.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].name.as_deref(), Some("Jane Doe"));
    assert_eq!(accepted[0].email.as_deref(), Some("jane@example.com"));
    assert!(!accepted[0].message.as_deref().unwrap().contains("script"));
    server.stop().await;
}

#[tokio::test]
async fn test_window_admits_five_then_limits_then_resets() {
    let server = start_server(Arc::new(RecordingSink::default())).await;

    for i in 0..5 {
        let response = client()
            .post(server.url("/api/contact"))
            .header("x-forwarded-for", "198.51.100.20")
            .json(&valid_submission("Alice"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "submission {i}");
        assert_eq!(
            response.headers()["ratelimit-remaining"],
            (4 - i).to_string().as_str()
        );
    }

    let limited = client()
        .post(server.url("/api/contact"))
        .header("x-forwarded-for", "198.51.100.20")
        .json(&valid_submission("Alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.headers()["ratelimit-policy"], "5;w=900");
    assert!(limited.headers().contains_key("retry-after"));
    let body: serde_json::Value = limited.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Too many form submissions. Please try again in 15 minutes."
    );

    let window = server
        .limiter
        .window(&RateLimitKey::new("198.51.100.20"))
        .unwrap();
    assert_eq!(window.count, 5);

    server.clock.advance(Duration::from_secs(900));
    let after = client()
        .post(server.url("/api/contact"))
        .header("x-forwarded-for", "198.51.100.20")
        .json(&valid_submission("Alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::OK);
    server.stop().await;
}

#[tokio::test]
async fn test_clients_have_independent_budgets() {
    let server = start_server(Arc::new(RecordingSink::default())).await;

    for _ in 0..5 {
        client()
            .post(server.url("/api/contact"))
            .header("x-forwarded-for", "192.0.2.1, 10.0.0.1")
            .json(&valid_submission("Alice"))
            .send()
            .await
            .unwrap();
    }

    let other = client()
        .post(server.url("/api/contact"))
        .header("x-real-ip", "192.0.2.2")
        .json(&valid_submission("Bob"))
        .send()
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);

    let exhausted = client()
        .post(server.url("/api/contact"))
        .header("x-forwarded-for", "192.0.2.1")
        .json(&valid_submission("Alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(exhausted.status(), StatusCode::TOO_MANY_REQUESTS);
    server.stop().await;
}

#[tokio::test]
async fn test_disallowed_origin_rejected_before_limiter() {
    let sink = Arc::new(RecordingSink::default());
    let server = start_server(sink.clone()).await;

    let response = client()
        .post(server.url("/api/contact"))
        .header("origin", "https://evil.test")
        .header("x-forwarded-for", "198.51.100.99")
        .json(&valid_submission("Mallory"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "CORS policy violation");
    assert!(server
        .limiter
        .window(&RateLimitKey::new("198.51.100.99"))
        .is_none());
    assert!(sink.accepted().is_empty());
    server.stop().await;
}

#[tokio::test]
async fn test_allowed_origin_gets_cors_headers() {
    let server = start_server(Arc::new(RecordingSink::default())).await;

    let response = client()
        .post(server.url("/api/contact"))
        .header("origin", ALLOWED_ORIGIN)
        .json(&valid_submission("Alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        ALLOWED_ORIGIN
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");

    let preflight = client()
        .request(reqwest::Method::OPTIONS, server.url("/api/contact"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
    server.stop().await;
}

#[tokio::test]
async fn test_health_ignores_origin() {
    let server = start_server(Arc::new(RecordingSink::default())).await;

    let response = client()
        .get(server.url("/api/health"))
        .header("origin", "https://monitor.elsewhere.test")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("x-request-id"));
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");

    let preflight = client()
        .request(reqwest::Method::OPTIONS, server.url("/api/health"))
        .header("origin", "https://monitor.elsewhere.test")
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        preflight.headers()["access-control-allow-methods"],
        "GET, OPTIONS"
    );
    server.stop().await;
}

#[tokio::test]
async fn test_form_encoded_submission() {
    let sink = Arc::new(RecordingSink::default());
    let server = start_server(sink.clone()).await;

    let response = client()
        .post(server.url("/api/contact"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Carol&email=carol%40example.com&message=Please+send+me+a+brochure.")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.accepted()[0].name.as_deref(), Some("Carol"));
    server.stop().await;
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = start_server(Arc::new(RecordingSink::default())).await;

    let response = client().get(server.url("/api/unknown")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Route not found");
    server.stop().await;
}

#[tokio::test]
async fn test_failing_sink_returns_generic_500() {
    let server = start_server(Arc::new(FailingSink)).await;

    let response = client()
        .post(server.url("/api/contact"))
        .json(&valid_submission("Alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Internal server error");
    assert!(!body.to_string().contains("smtp"));
    server.stop().await;
}
