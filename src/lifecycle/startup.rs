//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener
//! - Build the server and run it until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration is already loaded and validated by the caller

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind, serve, and return once `shutdown` has fired and requests drained.
pub async fn serve(config: AppConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %address,
        allowed_origins = %config.cors.allowed_origins,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
