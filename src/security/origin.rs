//! Origin admission policy (CORS).
//!
//! # State Machine
//! ```text
//! path == /api/health  →  HealthRoute  →  always admitted, OPTIONS answered with 204
//! any other path       →  StandardRoute
//!     no Origin header         →  admitted
//!     Origin in allowed set    →  admitted (credentials allowed)
//!     otherwise                →  rejected (403)
//! ```
//!
//! # Design Decisions
//! - Pure decision function; the HTTP adapter owns headers and status codes
//! - Exact string match only, no wildcard or suffix matching
//! - An empty Origin header counts as absent

use std::collections::HashSet;

use axum::http::Method;

pub const HEALTH_PATH: &str = "/api/health";

/// Immutable set of origins allowed to call standard routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOriginSet {
    origins: HashSet<String>,
}

impl AllowedOriginSet {
    /// Parse a comma-separated list. Entries are trimmed and empty ones dropped.
    pub fn parse(list: &str) -> Self {
        let origins = list
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        Self { origins }
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }
}

/// Which branch of the gate a path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Health,
    Standard,
}

impl RouteClass {
    pub fn of(path: &str) -> Self {
        if path == HEALTH_PATH {
            RouteClass::Health
        } else {
            RouteClass::Standard
        }
    }
}

/// Outcome of evaluating one request against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// Health route: permissive headers, no further gating.
    HealthBypass { preflight: bool },
    /// Standard route, origin acceptable. `origin` is `None` for non-browser callers.
    Admitted {
        origin: Option<String>,
        preflight: bool,
    },
    /// Standard route, origin not in the allowed set.
    Rejected { origin: String },
}

/// Route-aware origin policy.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: AllowedOriginSet,
}

impl OriginPolicy {
    pub fn new(allowed: AllowedOriginSet) -> Self {
        Self { allowed }
    }

    pub fn evaluate(&self, path: &str, method: &Method, origin: Option<&str>) -> OriginDecision {
        let preflight = *method == Method::OPTIONS;

        if RouteClass::of(path) == RouteClass::Health {
            return OriginDecision::HealthBypass { preflight };
        }

        match origin.filter(|o| !o.is_empty()) {
            None => OriginDecision::Admitted {
                origin: None,
                preflight,
            },
            Some(o) if self.allowed.contains(o) => OriginDecision::Admitted {
                origin: Some(o.to_string()),
                preflight,
            },
            Some(o) => OriginDecision::Rejected {
                origin: o.to_string(),
            },
        }
    }
}
