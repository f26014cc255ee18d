use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Bounded exponential backoff for a single provider call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Adds up to 25% random jitter to each wait.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1-based): base, 2x base, 4x base ... capped.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let extra = {
            let mut rng = rand::thread_rng();
            rng.gen_range(0..=delay.as_millis() as u64 / 4)
        };
        delay + Duration::from_millis(extra)
    }
}

/// Runs `op` until it succeeds, the error is not retryable, or attempts run out.
/// The last error is returned on failure.
pub async fn with_retry<T, E, F, Fut, P>(policy: &RetryPolicy, should_retry: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && should_retry(&e) => {
                let delay = policy.backoff_for(attempt);
                warn!(attempt, max_attempts = attempts, ?delay, "attempt failed, retrying: {}", e);
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(attempt, "giving up: {}", e);
                return Err(e);
            }
        }
    }
}
