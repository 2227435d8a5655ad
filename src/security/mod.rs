//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → origin.rs (route-aware CORS decision)
//!     → [body parsed, sanitized, validated]
//!     → client_key.rs (derive per-client key)
//!     → rate_limit.rs (fixed-window check)
//!     → Pass to submission sink
//! ```
//!
//! # Design Decisions
//! - Decisions are pure; the HTTP layer turns them into responses
//! - Fail closed: a rejected origin never reaches later stages
//! - Limiter state is injected, never global

pub mod client_key;
pub mod clock;
pub mod origin;
pub mod rate_limit;

pub use client_key::RateLimitKey;
pub use clock::{Clock, ManualClock, SystemClock};
pub use origin::{AllowedOriginSet, OriginDecision, OriginPolicy, HEALTH_PATH};
pub use rate_limit::{InMemoryStore, RateLimitSnapshot, RateLimitStore, RateLimiter, WindowPolicy};
