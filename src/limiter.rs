// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client IP.
//!
//! Each key owns one window. The first request in a window opens it with a
//! count of 1; further requests increment the count until the limit is
//! reached, after which requests are rejected until the window's reset time
//! passes. An expired window is replaced, never decremented.
//!
//! State lives only in process memory, so the limit applies per instance.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }

    /// Whole seconds until retry, rounded up. Zero for allowed results.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            RateLimitResult::Allowed { .. } => 0,
            RateLimitResult::Limited { retry_after } => ceil_secs(*retry_after),
        }
    }
}

/// Per-key window state.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    /// Requests accepted in the current window
    pub count: u32,
    /// When the current window expires
    pub reset_time: Instant,
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Arc<RwLock<HashMap<String, RateLimitEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check and record a request for `key` at the current instant.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now()).await
    }

    /// Check and record a request for `key` as if it arrived at `now`.
    ///
    /// The read-modify-write happens under a single write lock, so concurrent
    /// requests for the same key cannot both take the last slot.
    pub async fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.get_mut(key) {
            if now <= entry.reset_time {
                let reset_in = entry.reset_time.saturating_duration_since(now);
                if entry.count >= self.config.max_requests {
                    debug!(key, count = entry.count, ?reset_in, "Rate limit exceeded");
                    return RateLimitResult::Limited {
                        retry_after: reset_in,
                    };
                }
                entry.count += 1;
                return RateLimitResult::Allowed {
                    remaining: self.config.max_requests.saturating_sub(entry.count),
                    reset_in,
                };
            }
        }

        // No window yet, or the previous one expired
        entries.insert(
            key.to_string(),
            RateLimitEntry {
                count: 1,
                reset_time: now + window,
            },
        );
        RateLimitResult::Allowed {
            remaining: self.config.max_requests.saturating_sub(1),
            reset_in: window,
        }
    }

    /// Snapshot of the entry for `key`, if one exists.
    pub async fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.read().await.get(key).copied()
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
