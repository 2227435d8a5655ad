//! Contact form gateway.
//!
//! Accepts contact submissions over HTTP and passes them through an ordered
//! set of gates before handing them to a [`SubmissionSink`].
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ origin gate ──▶ body parse ──▶ sanitize ──▶ validate ──▶ rate limit ──▶ sink
//!                 │   (403)        (400/413)                  (400)        (429)       (500)
//!                 │
//!                 └── /api/health bypasses every gate
//! ```
//!
//! Cross-cutting: `config` (file + env), `observability` (tracing, metrics),
//! `lifecycle` (startup, signals, graceful shutdown).

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod submission;

pub use config::AppConfig;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use submission::{Submission, SubmissionSink};
