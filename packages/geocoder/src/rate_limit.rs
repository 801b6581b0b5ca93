//! Minimum-interval request spacing for rate-limited providers.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes callers so consecutive requests are at least
/// `min_interval` apart.
pub struct RateLimiter {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter. A zero interval never waits.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Waits until a request is allowed, then records it.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                log::trace!("Rate limiting: sleeping {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        *last = Some(Instant::now());
    }
}
