//! Bounded exponential backoff for transient data-plane errors
//!
//! Transient Redis round-trip failures are retried locally; the error
//! surfaces only once the attempt budget is exhausted.

use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff policy: `base * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl BackoffPolicy {
    /// Delay to sleep before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exp.min(self.max_delay)
    }
}

/// Run `op` with bounded exponential backoff on transient errors.
///
/// Non-transient errors propagate immediately.
pub async fn retry<T, F, Fut>(policy: &BackoffPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Transient error in {} (attempt {}): {}; retrying in {:?}",
                    label,
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Convenience wrapper using the default policy
pub async fn retry_default<T, F, Fut>(label: &str, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry(&BackoffPolicy::default(), label, op).await
}
