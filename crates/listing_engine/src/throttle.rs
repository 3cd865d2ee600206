use std::time::Duration;

use crawl_logging::crawl_info;

pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Politeness delay between page fetches, drawn uniformly from `[0, max_delay)`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    max_delay: Duration,
}

impl RateLimiter {
    pub fn new(max_delay: Duration) -> Self {
        Self { max_delay }
    }

    /// A limiter that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn next_delay(&self) -> Duration {
        if self.max_delay.is_zero() {
            return Duration::ZERO;
        }
        let upper = self.max_delay - Duration::from_nanos(1);
        self.max_delay.mul_f64(rand::random::<f64>()).min(upper)
    }

    pub async fn wait(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        crawl_info!("waiting {:.1}s before next page", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELAY)
    }
}
