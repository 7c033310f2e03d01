//! Rate limiter for login attempts
//!
//! Keyed on the login name so a single account cannot be brute forced.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

#[derive(Debug)]
struct Attempts {
    count: u32,
    window_start: Instant,
    banned_until: Option<Instant>,
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Attempts>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now()).await
    }

    async fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;

        // Keys whose window and ban are both over carry no state worth keeping
        let window = Duration::from_secs(self.config.window_seconds);
        entries.retain(|_, attempts| {
            attempts.banned_until.is_some_and(|until| now < until)
                || now.duration_since(attempts.window_start) < window
        });

        let entry = entries.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            window_start: now,
            banned_until: None,
        });

        if let Some(banned_until) = entry.banned_until {
            if now < banned_until {
                return false;
            }
            entry.count = 0;
            entry.banned_until = None;
            entry.window_start = now;
        }

        if now.duration_since(entry.window_start) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.config.max_attempts {
            entry.banned_until = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.count += 1;
        true
    }

    /// Forget the attempts for `key`, after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds: 60,
            ban_duration_seconds: 120,
        })
    }

    #[tokio::test]
    async fn test_bans_after_max_attempts() {
        let limiter = limiter(3);
        let start = Instant::now();

        for _ in 0..3 {
            assert!(limiter.is_allowed_at("maria", start).await);
        }
        assert!(!limiter.is_allowed_at("maria", start).await);
        // Other keys are unaffected
        assert!(limiter.is_allowed_at("joao", start).await);
    }

    #[tokio::test]
    async fn test_ban_expires() {
        let limiter = limiter(1);
        let start = Instant::now();

        assert!(limiter.is_allowed_at("maria", start).await);
        assert!(!limiter.is_allowed_at("maria", start).await);
        assert!(
            !limiter
                .is_allowed_at("maria", start + Duration::from_secs(119))
                .await
        );
        assert!(
            limiter
                .is_allowed_at("maria", start + Duration::from_secs(121))
                .await
        );
    }

    #[tokio::test]
    async fn test_window_resets_attempts() {
        let limiter = limiter(2);
        let start = Instant::now();

        assert!(limiter.is_allowed_at("maria", start).await);
        assert!(limiter.is_allowed_at("maria", start).await);
        assert!(
            limiter
                .is_allowed_at("maria", start + Duration::from_secs(61))
                .await
        );
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let limiter = limiter(1);
        assert!(limiter.is_allowed("maria").await);
        limiter.reset("maria").await;
        assert!(limiter.is_allowed("maria").await);
        assert_eq!(limiter.config().max_attempts, 1);
    }

    #[tokio::test]
    async fn test_stale_keys_are_evicted() {
        let limiter = limiter(1);
        let start = Instant::now();

        for name in ["a", "b", "c"] {
            assert!(limiter.is_allowed_at(name, start).await);
        }
        // "a" is now banned until start + 120s
        assert!(!limiter.is_allowed_at("a", start).await);
        assert_eq!(limiter.tracked_keys().await, 3);

        // Windows of "b" and "c" are over, the ban on "a" still holds
        assert!(limiter.is_allowed_at("d", start + Duration::from_secs(61)).await);
        assert_eq!(limiter.tracked_keys().await, 2);
        assert!(!limiter.is_allowed_at("a", start + Duration::from_secs(61)).await);

        // Once the ban is over too, only the fresh key remains
        assert!(limiter.is_allowed_at("e", start + Duration::from_secs(200)).await);
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
