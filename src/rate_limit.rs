//! In-memory rate limiting for admin login attempts.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by the client address. Only failed attempts are recorded, so an
//! admin who types the password correctly is never slowed down, while a
//! guesser is locked out for the rest of the window.
//! Keys whose failures have all aged out are swept whenever a new failure
//! is recorded.
//!
//! Limits come from the environment:
//! - `LOGIN_RATE_LIMIT` failures per key (default 5)
//! - `LOGIN_RATE_LIMIT_WINDOW_SECS` window length (default 300)

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_LIMIT: usize = 5;
const DEFAULT_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub limit: usize,
    pub window: Duration,
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            limit: env_parse("LOGIN_RATE_LIMIT", DEFAULT_LIMIT),
            window: Duration::from_secs(env_parse("LOGIN_RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, window: Duration::from_secs(DEFAULT_WINDOW_SECS) }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("too many failed attempts (max {limit} per {window_secs}s)")]
pub struct RateLimitError {
    pub limit: usize,
    pub window_secs: u64,
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), config }
    }

    /// Fail if `key` has used up its failures for the current window.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] while the key is locked out.
    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(deque) = inner.get_mut(key) else {
            return Ok(());
        };
        prune_window(deque, now, self.config.window);
        if deque.len() >= self.config.limit {
            return Err(RateLimitError { limit: self.config.limit, window_secs: self.config.window.as_secs() });
        }
        if deque.is_empty() {
            inner.remove(key);
        }
        Ok(())
    }

    /// Record one failed attempt for `key`.
    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    fn record_failure_at(&self, key: &str, now: Instant) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = self.config.window;
        // Drop every key whose failures have all aged out, so one-off
        // addresses do not accumulate.
        inner.retain(|_, deque| {
            prune_window(deque, now, window);
            !deque.is_empty()
        });
        inner.entry(key.to_owned()).or_default().push_back(now);
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Forget all failures for `key` (after a successful login).
    pub fn reset(&self, key: &str) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.remove(key);
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
