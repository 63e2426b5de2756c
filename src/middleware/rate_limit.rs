//! Sliding-window throttle for credential endpoints, keyed by client address.
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    /// Records an attempt for `key` and reports whether it is within budget.
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut attempts = self.attempts.write().await;
        let history = attempts.entry(key.to_string()).or_default();

        while history
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            history.pop_front();
        }

        if history.len() < self.max_attempts {
            history.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops keys whose attempts have all left the window.
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;
        attempts.retain(|_, history| {
            history.retain(|&t| now.duration_since(t) < self.window);
            !history.is_empty()
        });
        tracing::debug!("Login throttle pruned: {} active keys", attempts.len());
        attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocks_after_budget() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("ip", start).await);
        assert!(!limiter.check_at("ip", start + Duration::from_secs(30)).await);
        assert!(limiter.check_at("ip", start + Duration::from_secs(61)).await);
    }

    #[tokio::test]
    async fn test_prune_removes_idle_keys() {
        let limiter = RateLimiter::new(5, Duration::from_millis(50));
        limiter.check("a").await;
        limiter.check("b").await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(limiter.prune().await, 0);
    }
}
