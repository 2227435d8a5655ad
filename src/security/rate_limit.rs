//! Fixed-window rate limiting for contact submissions.
//!
//! # Algorithm
//! ```text
//! no window, or now - start >= window  →  new window, count = 1, admit
//! count < max                          →  count += 1, admit
//! otherwise                            →  reject (count unchanged)
//! ```
//!
//! # Design Decisions
//! - Check-and-update is one step under the store's per-key lock
//! - State lives in an injectable `RateLimitStore`; time in a `Clock`
//! - Only validated submissions reach the limiter
//! - Expired windows are purged by a background task

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::security::client_key::RateLimitKey;
use crate::security::clock::{Clock, SystemClock};

pub const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
pub const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
pub const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
pub const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Window length and admission ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 5,
        }
    }
}

impl From<&RateLimitConfig> for WindowPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
        }
    }
}

/// Per-key window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub start: Instant,
    pub count: u32,
}

impl RateLimitWindow {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.start) >= window
    }
}

/// Result of one store hit.
#[derive(Debug, Clone, Copy)]
pub struct HitOutcome {
    pub admitted: bool,
    pub window: RateLimitWindow,
}

/// Storage for per-key windows.
///
/// `hit` must be atomic per key: no other hit for the same key may observe
/// the count between its read and its write.
pub trait RateLimitStore: Send + Sync + std::fmt::Debug {
    fn hit(&self, key: &RateLimitKey, now: Instant, policy: &WindowPolicy) -> HitOutcome;

    fn get(&self, key: &RateLimitKey) -> Option<RateLimitWindow>;

    /// Drop windows that have ended. Returns the number removed.
    fn purge_expired(&self, now: Instant, window: Duration) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    windows: DashMap<RateLimitKey, RateLimitWindow>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryStore {
    fn hit(&self, key: &RateLimitKey, now: Instant, policy: &WindowPolicy) -> HitOutcome {
        let mut entry = self
            .windows
            .entry(key.clone())
            .or_insert(RateLimitWindow { start: now, count: 0 });

        if entry.is_expired(now, policy.window) {
            *entry = RateLimitWindow { start: now, count: 0 };
        }

        let admitted = entry.count < policy.max_requests;
        if admitted {
            entry.count += 1;
        }

        HitOutcome {
            admitted,
            window: *entry,
        }
    }

    fn get(&self, key: &RateLimitKey) -> Option<RateLimitWindow> {
        self.windows.get(key).map(|r| *r.value())
    }

    fn purge_expired(&self, now: Instant, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| !w.is_expired(now, window));
        before.saturating_sub(self.windows.len())
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}

/// Limiter decision with the numbers needed for response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    pub window: Duration,
    pub reset_after: Duration,
}

impl RateLimitSnapshot {
    /// Seconds until the window ends, rounded up.
    pub fn reset_secs(&self) -> u64 {
        let d = self.reset_after;
        d.as_secs() + u64::from(d.subsec_nanos() > 0)
    }

    /// Write the draft-6 `RateLimit-*` headers, plus `Retry-After` on rejection.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        let policy = format!("{};w={}", self.limit, self.window.as_secs());
        if let Ok(value) = HeaderValue::from_str(&policy) {
            headers.insert(RATELIMIT_POLICY, value);
        }
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(self.reset_secs()));
        if !self.admitted {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(self.reset_secs()));
        }
    }
}

/// Per-client fixed-window limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    policy: WindowPolicy,
}

impl RateLimiter {
    /// Limiter with an in-memory store and the system clock.
    pub fn new(policy: WindowPolicy) -> Self {
        Self::with_parts(policy, Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    pub fn with_parts(
        policy: WindowPolicy,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Count one submission against `key` and decide.
    pub fn check(&self, key: &RateLimitKey) -> RateLimitSnapshot {
        let now = self.clock.now();
        let outcome = self.store.hit(key, now, &self.policy);
        let reset_at = outcome.window.start + self.policy.window;

        RateLimitSnapshot {
            admitted: outcome.admitted,
            limit: self.policy.max_requests,
            remaining: self.policy.max_requests.saturating_sub(outcome.window.count),
            window: self.policy.window,
            reset_after: reset_at.saturating_duration_since(now),
        }
    }

    /// Current window for `key`, if one is tracked.
    pub fn window(&self, key: &RateLimitKey) -> Option<RateLimitWindow> {
        self.store.get(key)
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(self.clock.now(), self.policy.window)
    }

    /// Client-facing retry guidance for a rejected submission.
    pub fn retry_message(&self) -> String {
        let minutes = self.policy.window.as_secs().div_ceil(60).max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        format!("Too many form submissions. Please try again in {minutes} {unit}.")
    }

    /// Periodically drop expired windows until shutdown.
    pub async fn run_purge(self, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = every.as_secs(), "Rate limit purge task starting");

        let mut ticker = time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.purge_expired();
                    let tracked = self.tracked_clients();
                    metrics::record_tracked_clients(tracked);
                    if removed > 0 {
                        tracing::debug!(removed, tracked, "Purged expired rate limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit purge task received shutdown signal");
                    break;
                }
            }
        }
    }
}
