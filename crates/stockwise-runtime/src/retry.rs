//! # Retry
//!
//! A retry policy object and the combinator that consumes it.
//!
//! ## Schedule
//! ```text
//! attempt 1 ──fail──► sleep(base) ──► attempt 2 ──fail──► sleep(base·m) ──► attempt 3
//!                                                                             │
//!                                          fail on the last attempt ◄─────────┘
//!                                          returns that attempt's error
//! ```
//!
//! With the defaults (3 attempts, 1s base, multiplier 2) the delays are 1s
//! then 2s. There is no jitter: a delay depends only on the retry index.
//!
//! `RetryPolicy` hands out its delays through the `backoff` crate's
//! [`Backoff`] trait, the same interface the sync transport used for its
//! reconnect loop.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use tracing::{debug, error, warn};

/// Label used in logs for stock updates.
const STOCK_UPDATE: &str = "stock update";

// =============================================================================
// Retry Policy
// =============================================================================

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Growth factor applied per retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Default delays with a given attempt count.
    pub fn with_attempts(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based): `base · multiplier^retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.min(i32::MAX as u32) as i32);
        Duration::try_from_secs_f64(self.base_delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }

    /// Every delay the policy will ever hand out, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry| self.delay_for(retry))
            .collect()
    }

    /// A fresh backoff iterator over [`schedule`](Self::schedule).
    pub fn backoff(&self) -> PolicyBackoff {
        PolicyBackoff {
            policy: *self,
            issued: 0,
        }
    }
}

/// [`Backoff`] over a [`RetryPolicy`]. Returns `None` once the attempts are
/// used up.
#[derive(Debug, Clone)]
pub struct PolicyBackoff {
    policy: RetryPolicy,
    issued: u32,
}

impl Backoff for PolicyBackoff {
    fn reset(&mut self) {
        self.issued = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.issued.saturating_add(1) >= self.policy.max_attempts {
            return None;
        }
        let delay = self.policy.delay_for(self.issued);
        self.issued += 1;
        Some(delay)
    }
}

// =============================================================================
// Combinator
// =============================================================================

/// Runs `op` until it succeeds or the policy runs out of attempts.
///
/// Each failed attempt is logged at `warn!`, the terminal failure at
/// `error!`. The returned error is the one from the last attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = %operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => match backoff.next_backoff() {
                Some(delay) => {
                    warn!(
                        operation = %operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    error!(operation = %operation, attempts = attempt, error = %err, "All attempts failed");
                    return Err(err);
                }
            },
        }
    }
}

/// Retries a stock update `retries` times in total with 1s, 2s, ... delays.
pub async fn handle_concurrent_stock_update<T, E, F, Fut>(update: F, retries: u32) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry(&RetryPolicy::with_attempts(retries), STOCK_UPDATE, update).await
}
