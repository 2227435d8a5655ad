//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, origin gate, timeout, body limit)
//! - Bind server to listener
//! - Run the rate limit purge task alongside the server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers::{self, CONTACT_PATH};
use crate::http::middleware::origin_gate;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::security::{AllowedOriginSet, OriginPolicy, RateLimiter, WindowPolicy, HEALTH_PATH};
use crate::submission::{LoggingSink, SubmissionSink};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: RateLimiter,
    pub sink: Arc<dyn SubmissionSink>,
    pub environment: Arc<str>,
}

/// HTTP server for the contact gateway.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    limiter: RateLimiter,
}

impl HttpServer {
    /// Create a server with the default limiter and the logging sink.
    pub fn new(config: AppConfig) -> Self {
        let limiter = RateLimiter::new(WindowPolicy::from(&config.rate_limit));
        Self::with_components(config, limiter, Arc::new(LoggingSink))
    }

    /// Create a server around an existing limiter and sink.
    pub fn with_components(
        config: AppConfig,
        limiter: RateLimiter,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        let state = AppState {
            limiter: limiter.clone(),
            sink,
            environment: Arc::from(config.environment.as_str()),
        };
        let policy = Arc::new(OriginPolicy::new(AllowedOriginSet::parse(
            &config.cors.allowed_origins,
        )));

        let router = Self::build_router(&config, state, policy);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: request ID, trace span, request ID propagation,
    /// origin gate, timeout, body limit.
    fn build_router(config: &AppConfig, state: AppState, policy: Arc<OriginPolicy>) -> Router {
        Router::new()
            .route(HEALTH_PATH, get(handlers::health).fallback(handlers::not_found))
            .route(CONTACT_PATH, post(handlers::contact).fallback(handlers::not_found))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.server.request_timeout_secs),
            ))
            .layer(middleware::from_fn_with_state(policy, origin_gate))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            "HTTP server starting"
        );

        let purge_every = Duration::from_secs(self.config.rate_limit.purge_interval_secs);
        let purge = tokio::spawn(
            self.limiter
                .clone()
                .run_purge(purge_every, shutdown.resubscribe()),
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        if let Err(e) = purge.await {
            tracing::error!(error = %e, "Rate limit purge task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with every layer applied, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
