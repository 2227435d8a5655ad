//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/origin_gate.rs (CORS admission, health bypass)
//!     → request.rs (request ID, JSON/form body extraction)
//!     → handlers.rs (sanitize → validate → rate limit → sink)
//!     → response.rs (JSON envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::CONTACT_PATH;
pub use request::{SubmissionBody, UuidRequestId, X_REQUEST_ID};
pub use response::{ApiResponse, HealthStatus};
pub use server::{AppState, HttpServer};
