//! Shared utilities for end-to-end tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contact_gate::config::AppConfig;
use contact_gate::http::HttpServer;
use contact_gate::lifecycle::Shutdown;
use contact_gate::security::{InMemoryStore, ManualClock, RateLimiter, WindowPolicy};
use contact_gate::submission::{SinkError, Submission, SubmissionSink};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ALLOWED_ORIGIN: &str = "https://site.test";

/// Sink that keeps every accepted submission.
#[derive(Default)]
pub struct RecordingSink {
    accepted: Mutex<Vec<Submission>>,
}

impl RecordingSink {
    pub fn accepted(&self) -> Vec<Submission> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn accept(&self, submission: &Submission) -> Result<(), SinkError> {
        self.accepted.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

/// Sink that always reports the downstream as unavailable.
pub struct FailingSink;

#[async_trait]
impl SubmissionSink for FailingSink {
    async fn accept(&self, _submission: &Submission) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("smtp connection refused".into()))
    }
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub clock: ManualClock,
    pub limiter: RateLimiter,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger graceful shutdown and wait for the server task.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = "test".into();
    config.server.host = "127.0.0.1".into();
    config.server.port = 0;
    config.cors.allowed_origins = format!("{ALLOWED_ORIGIN}, http://localhost:8080");
    config
}

/// Start a server with a manual clock and the given sink.
pub async fn start_server(sink: Arc<dyn SubmissionSink>) -> TestServer {
    start_server_with(test_config(), sink).await
}

pub async fn start_server_with(config: AppConfig, sink: Arc<dyn SubmissionSink>) -> TestServer {
    let clock = ManualClock::default();
    let limiter = RateLimiter::with_parts(
        WindowPolicy::from(&config.rate_limit),
        Arc::new(InMemoryStore::new()),
        Arc::new(clock.clone()),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_components(config, limiter.clone(), sink);
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestServer {
        addr,
        clock,
        limiter,
        shutdown,
        handle,
    }
}

pub fn valid_submission(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": "Visitor@Example.com",
        "phone": "+1 (555) 010-9999",
        "message": "Hello, I would like a quote for a new website."
    })
}
