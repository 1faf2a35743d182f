use std::time::{Duration, Instant};

use dashmap::DashMap;

const MAX_FAILURES: u32 = 5;
const WINDOW_SECS: u64 = 15 * 60;

/// Per-email login brute force limiter.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter; call `record_failure()` on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let window = Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= MAX_FAILURES {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(WINDOW_SECS.saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let window = Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget failures after a successful login.
    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}
