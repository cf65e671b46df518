//! Failed-login throttling.
//!
//! Failures are counted per client key in a fixed window that starts at the
//! first failure. Once the limit is reached further attempts are refused with
//! `429` until the window lapses; a successful login clears the counter.
//! Lapsed windows are pruned at most once per window length.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::Error;

#[derive(Debug, Clone, Copy)]
struct Window {
    failures: u32,
    started: DateTime<Utc>,
}

/// Per-client failed login counter.
pub struct LoginThrottle {
    windows: DashMap<String, Window>,
    limit: u32,
    window: TimeDelta,
    clock: Arc<dyn Clock>,
    last_prune: AtomicI64,
}

impl LoginThrottle {
    pub fn new(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            limit: limit.max(1),
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            last_prune: AtomicI64::new(clock.utc().timestamp()),
            clock,
        }
    }

    fn expired(&self, window: &Window, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(window.started) >= self.window
    }

    /// Refuse the attempt when `key` has exhausted its failures.
    pub fn check(&self, key: &str) -> Result<(), Error> {
        let now = self.clock.utc();
        let blocked = self
            .windows
            .get(key)
            .is_some_and(|window| !self.expired(&window, now) && window.failures >= self.limit);
        if blocked {
            warn!(client = key, "login throttled");
            return Err(Error::too_many_requests(
                "too many failed login attempts; try again later",
            ));
        }
        Ok(())
    }

    /// Drop every lapsed window, returning how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.utc();
        let before = self.windows.len();
        self.windows.retain(|_, window| !self.expired(window, now));
        before.saturating_sub(self.windows.len())
    }

    fn prune_if_due(&self, now: DateTime<Utc>) {
        let last = self.last_prune.load(Ordering::Relaxed);
        let due = DateTime::from_timestamp(last, 0)
            .is_none_or(|at| now.signed_duration_since(at) >= self.window);
        if due
            && self
                .last_prune
                .compare_exchange(last, now.timestamp(), Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        {
            let removed = self.prune_expired();
            if removed > 0 {
                debug!(removed, "pruned lapsed login throttle windows");
            }
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    pub fn record_failure(&self, key: &str) {
        let now = self.clock.utc();
        self.prune_if_due(now);
        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            failures: 0,
            started: now,
        });
        if self.expired(&entry, now) {
            *entry = Window {
                failures: 0,
                started: now,
            };
        }
        entry.failures = entry.failures.saturating_add(1);
    }

    pub fn reset(&self, key: &str) {
        self.windows.remove(key);
    }
}
