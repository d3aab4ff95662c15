// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the contact endpoints.
//!
//! Each client key gets a window that opens on its first accepted request.
//! Up to `max_requests` are accepted inside the window; later requests are
//! limited until the window elapses, at which point the counter resets.

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
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
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Counter for one client inside its current window.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    window_start: DateTime<Utc>,
    count: u32,
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    max_requests: u32,
    window: chrono::Duration,
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<String, WindowRecord>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration and time source.
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = chrono::Duration::from_std(config.window_duration())
            .unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            max_requests: config.max_requests,
            window,
            clock,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Accepted requests per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// End of a window opened at `start`, saturating at the latest
    /// representable instant.
    fn window_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Check and count a request for `key`.
    ///
    /// The lookup, reset and increment happen under one write lock, so
    /// concurrent callers for the same key never overshoot the limit.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let now = self.clock.now();
        let mut records = self.records.write().await;
        let record = records.entry(key.to_string()).or_insert(WindowRecord {
            window_start: now,
            count: 0,
        });

        if now >= self.window_end(record.window_start) {
            debug!(client = %key, "Rate window elapsed, resetting");
            record.window_start = now;
            record.count = 0;
        }

        let reset_in = (self.window_end(record.window_start) - now)
            .to_std()
            .unwrap_or(Duration::ZERO);

        if record.count < self.max_requests {
            record.count += 1;
            RateLimitResult::Allowed {
                remaining: self.max_requests - record.count,
                reset_in,
            }
        } else {
            debug!(client = %key, ?reset_in, "Rate limit exceeded");
            RateLimitResult::Limited {
                retry_after: reset_in,
            }
        }
    }

    /// Drop records whose window has elapsed (should be called periodically).
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| now < self.window_end(record.window_start));
        before - records.len()
    }

    /// Number of clients with a live record.
    pub async fn tracked_clients(&self) -> usize {
        self.records.read().await.len()
    }
}
