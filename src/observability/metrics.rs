//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_submissions_total` (counter): submissions by outcome
//! - `cors_rejections_total` (counter): requests refused by the origin gate
//! - `rate_limit_rejections_total` (counter): submissions refused with 429
//! - `rate_limit_tracked_clients` (gauge): windows held in memory
//! - `http_request_duration_seconds` (histogram): contact handler latency
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Final outcome of a contact submission, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    MalformedBody,
    Invalid,
    RateLimited,
    SinkFailed,
}

impl SubmissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::Accepted => "accepted",
            SubmissionOutcome::MalformedBody => "malformed_body",
            SubmissionOutcome::Invalid => "invalid",
            SubmissionOutcome::RateLimited => "rate_limited",
            SubmissionOutcome::SinkFailed => "sink_failed",
        }
    }
}

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(outcome: SubmissionOutcome, start: Instant) {
    counter!("contact_submissions_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("http_request_duration_seconds", "route" => "contact")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cors_rejection() {
    counter!("cors_rejections_total").increment(1);
}

pub fn record_rate_limited() {
    counter!("rate_limit_rejections_total").increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("rate_limit_tracked_clients").set(count as f64);
}
