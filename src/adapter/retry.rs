//! Retry with exponential backoff and jitter for transient provider failures.
//!
//! Delays are `tokio::time::sleep`s, so a backing-off call only suspends its
//! own task. Other adapters and claims keep running.

use std::future::Future;
use std::time::Duration;

use rand_core::{OsRng, RngCore};
use tracing::debug;

use crate::constants::DEFAULT_RETRY_ATTEMPTS;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Backoff before retry `n` (0-based) is `base_delay * 2^n + jitter`.
    pub base_delay: Duration,
    /// Jitter is uniform in `[0, max_jitter)`.
    pub max_jitter: Duration,
    /// Random delay before every request, uniform in `[min, max)`. Spreads
    /// concurrent load on the provider.
    pub pre_request_delay: Option<(Duration, Duration)>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
            pre_request_delay: Some((Duration::from_millis(500), Duration::from_millis(1500))),
        }
    }
}

impl RetryPolicy {
    /// A policy without any sleeping. Useful when the provider is local.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
            pre_request_delay: None,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn with_pre_request_delay(mut self, range: Option<(Duration, Duration)>) -> Self {
        self.pre_request_delay = range;
        self
    }

    /// Backoff slept after failed attempt `attempt` (0-based).
    /// `jitter_fraction` is expected in `[0, 1)`.
    pub fn backoff_delay(&self, attempt: u32, jitter_fraction: f64) -> Duration {
        let factor = 2f64.powi(attempt.min(16) as i32);
        self.base_delay.mul_f64(factor) + self.max_jitter.mul_f64(jitter_fraction)
    }

    fn pre_request_sleep(&self, fraction: f64) -> Option<Duration> {
        self.pre_request_delay.map(|(min, max)| {
            let spread = max.saturating_sub(min);
            min + spread.mul_f64(fraction)
        })
    }
}

/// Uniform sample in `[0, 1)` from the OS RNG.
pub fn uniform_jitter() -> f64 {
    // Top 53 bits give an exactly representable f64 in [0, 1).
    (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Runs `op` until it yields a value that `should_retry` rejects, or attempts
/// run out. The final outcome (value or error) is returned as-is; nothing is
/// raised beyond what `op` itself returns.
///
/// `op` receives the 0-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    should_retry: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&T) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        if let Some(delay) = policy.pre_request_sleep(uniform_jitter())
            && !delay.is_zero()
        {
            tokio::time::sleep(delay).await;
        }

        let result = op(attempt).await;
        let is_last = attempt + 1 >= attempts;

        let retryable = match &result {
            Ok(value) => should_retry(value),
            Err(_) => true,
        };
        if !retryable || is_last {
            return result;
        }

        match &result {
            Ok(_) => debug!(attempt, "Retryable provider response"),
            Err(e) => debug!(attempt, error = %e, "Provider call failed, retrying"),
        }

        let delay = policy.backoff_delay(attempt, uniform_jitter());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}
