use std::time::Duration;
use tokio::time::sleep;

use crate::indicators::Provider;

/// Fixed pause between indicators so the shared upstream quotas are respected.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    economic_delay: Duration,
    market_delay: Duration,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { economic_delay: delay, market_delay: delay }
    }

    pub fn with_market_delay(mut self, delay: Duration) -> Self {
        self.market_delay = delay;
        self
    }

    pub fn delay_for(&self, provider: Provider) -> Duration {
        match provider {
            // FRED throttles bursts aggressively
            Provider::Economic => self.economic_delay,
            Provider::Market => self.market_delay,
        }
    }

    /// Wait the configured delay for the provider just used.
    pub async fn wait(&self, provider: Provider) {
        let delay = self.delay_for(provider);
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
