//! Bounded retry with linear backoff.
//!
//! Transport-agnostic: the caller supplies a closure performing exactly one
//! attempt. Used for agent deliveries and database writes alike.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and backoff shape.
///
/// Delay before retry `n` (0-based) is `base_delay + step * n`; nothing is
/// slept before the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, step: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            step,
        }
    }

    /// Same attempt budget, no sleeping. Handy for tests and local backends.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_add(self.step.saturating_mul(retry))
    }
}

/// Run `op` until it succeeds or the budget is spent; every error is retried.
///
/// `op` receives the 0-based attempt index. The last error is returned.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_if(policy, op, |_| true).await
}

/// Like [`retry`], but stops at the first error for which `is_retryable`
/// returns false.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut op: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempt + 1 >= attempts || !is_retryable(&e) {
                    return Err(e);
                }
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
