//! Contact gateway entry point.
//!
//! ```text
//! CLI args → load config (file + env) → logging → serve
//!                                                   ▲
//!                         SIGINT / SIGTERM → Shutdown::trigger
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use contact_gate::config::load_config;
use contact_gate::lifecycle::{self, Shutdown};
use contact_gate::observability::logging::init_logging;

/// Contact form backend with origin gating and per-client rate limiting.
#[derive(Debug, Parser)]
#[command(name = "contact-gate", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listening port, overriding both the file and `PORT`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("contact-gate: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "contact-gate starting"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        lifecycle::shutdown_signal().await;
        trigger.trigger();
    });

    if let Err(e) = lifecycle::serve(config, &shutdown).await {
        tracing::error!(error = %e, "Fatal startup error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
