//! Fixed-window request counter keyed by an arbitrary string.
//!
//! State lives in this process only and resets on restart. Each check
//! updates its key under the map's shard lock, so concurrent requests for the
//! same key are counted correctly; nothing is coordinated across processes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Prune expired windows once the map grows past this many keys.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Outcome of a single [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000)
    }

    pub fn reset_at_millis(&self) -> i64 {
        self.reset_at.timestamp_millis()
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: chrono::Duration,
    entries: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window: chrono::Duration::from_std(window).unwrap_or(chrono::Duration::minutes(15)),
            entries: DashMap::new(),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    /// Count one request for `key` at `now`.
    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        if self.entries.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut entry = self.entries.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now + self.window,
        });

        if now > entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= self.limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: self.limit - entry.count,
            reset_at: entry.reset_at,
        }
    }

    /// Drop windows that have already expired.
    pub fn prune(&self, now: DateTime<Utc>) {
        self.entries.retain(|_, window| window.reset_at >= now);
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}
