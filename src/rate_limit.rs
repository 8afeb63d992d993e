// src/rate_limit.rs
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use crate::config::RateLimitConfig;

/// In-memory fixed-window request counter keyed by client address.
///
/// Best effort: state lives in this process only and resets on restart.
/// Windows open on a key's first request and reset once the configured
/// interval has elapsed.
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

struct Window {
    started: Instant,
    count: u32,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `key` and reports whether it is admitted.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        if self.config.max_requests == 0 {
            return true;
        }

        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means another request panicked mid-update;
            // the counter state is still usable.
            Err(poisoned) => poisoned.into_inner(),
        };

        // Keep the map from growing without bound under many distinct keys.
        if windows.len() > 10_000 {
            let window = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.config.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(max_requests: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_admits_up_to_ceiling() {
        let limiter = limiter(3, 900);
        let now = Instant::now();
        assert!(limiter.check_at("10.0.0.1", now));
        assert!(limiter.check_at("10.0.0.1", now));
        assert!(limiter.check_at("10.0.0.1", now));
        assert!(!limiter.check_at("10.0.0.1", now));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 900);
        let now = Instant::now();
        assert!(limiter.check_at("10.0.0.1", now));
        assert!(!limiter.check_at("10.0.0.1", now));
        assert!(limiter.check_at("10.0.0.2", now));
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 60);
        let start = Instant::now();
        assert!(limiter.check_at("10.0.0.1", start));
        assert!(!limiter.check_at("10.0.0.1", start + Duration::from_secs(59)));
        assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_ceiling_disables_limiter() {
        let limiter = limiter(0, 900);
        let now = Instant::now();
        for _ in 0..1000 {
            assert!(limiter.check_at("10.0.0.1", now));
        }
    }
}
