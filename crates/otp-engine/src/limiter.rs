//! Per-phone rolling-window rate limiter.
//!
//! Two rules, checked in order under the key's shard lock:
//! 1. cooldown - a minimum gap between successive issuances;
//! 2. quota - a cap on issuances inside the rolling window.
//!
//! The check-and-append is atomic per key, so two concurrent requests for
//! the same phone cannot both take the last remaining slot.

use std::fmt;
use std::sync::Arc;

use crate::clock::Clock;
use crate::shard::ShardedMap;

/// Why an issuance was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Too soon after the previous issuance.
    Cooldown { retry_after_secs: u64 },
    /// The rolling-window quota is exhausted.
    Quota { retry_after_secs: u64 },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooldown { retry_after_secs } => write!(
                f,
                "please wait {retry_after_secs} seconds before requesting another OTP"
            ),
            Self::Quota { retry_after_secs } => write!(
                f,
                "OTP request limit exceeded, try again in {retry_after_secs} seconds"
            ),
        }
    }
}

/// Outcome of [`RateLimiter::try_acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

/// Rolling-window limiter keyed by phone.
pub struct RateLimiter {
    windows: ShardedMap<Vec<i64>>,
    window_secs: i64,
    min_gap_secs: i64,
    max_per_window: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(
        window_secs: u64,
        min_gap_secs: u64,
        max_per_window: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            windows: ShardedMap::new(),
            window_secs: window_secs as i64,
            min_gap_secs: min_gap_secs as i64,
            max_per_window,
            clock,
        }
    }

    /// Atomically check the phone's history and, if allowed, record `now`.
    ///
    /// Denied attempts leave history untouched; the gap rule is enforced by
    /// rejecting new issuances, never by mutating what already happened.
    pub async fn try_acquire(&self, phone: &str) -> Decision {
        let now = self.clock.now_unix();
        let mut shard = self.windows.lock(phone).await;
        let stamps = shard.entry(phone.to_string()).or_default();

        stamps.retain(|&t| now - t <= self.window_secs);

        if let Some(&last) = stamps.last() {
            let elapsed = now - last;
            if elapsed < self.min_gap_secs {
                return Decision::Denied(DenyReason::Cooldown {
                    retry_after_secs: (self.min_gap_secs - elapsed) as u64,
                });
            }
        }

        if stamps.len() >= self.max_per_window {
            // The oldest stamp leaving the window frees the next slot. With
            // a zero cap the history is empty and no slot ever frees; the
            // full window is the honest retry hint then.
            let oldest = stamps.first().copied().unwrap_or(now);
            let retry_after = (oldest + self.window_secs + 1 - now).max(1);
            return Decision::Denied(DenyReason::Quota {
                retry_after_secs: retry_after as u64,
            });
        }

        stamps.push(now);
        Decision::Allowed
    }

    /// Drop windows whose newest timestamp has aged out entirely.
    ///
    /// Purely housekeeping: `try_acquire` prunes lazily and is correct
    /// without this ever running.
    pub async fn purge_idle(&self) -> usize {
        let now = self.clock.now_unix();
        let window = self.window_secs;
        let mut removed = 0;
        self.windows
            .for_each_shard(|shard| {
                let before = shard.len();
                shard.retain(|_, stamps| stamps.iter().any(|&t| now - t <= window));
                removed += before - shard.len();
            })
            .await;
        removed
    }
}
