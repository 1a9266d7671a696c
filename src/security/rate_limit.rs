//! Sliding-window rate limiting, keyed by `(source, action)`.
//!
//! One `DashMap` entry per `(source, action)` pair, windowed rather than
//! token-bucketed, since `check` must stay a pure read and `increment` a
//! separate write the caller issues only once the gated action actually
//! happens.

use crate::clock::Clock;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    window_start: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    pub limit: u32,
    pub window_secs: u64,
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    windows: DashMap<(String, &'static str), Window>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            windows: DashMap::new(),
        }
    }

    /// Whether `source` is still under `rule` for `action`. Read-only: does
    /// not consume a slot. Callers must call [`Self::increment`] themselves
    /// once the action is actually performed.
    pub fn check(&self, source: &str, action: &'static str, rule: RateLimitRule) -> bool {
        let now = self.clock.now_unix();
        match self.windows.get(&(source.to_string(), action)) {
            Some(window) if now - window.window_start < rule.window_secs as i64 => {
                window.count < rule.limit
            }
            _ => true,
        }
    }

    /// Record one occurrence of `action` by `source`, rolling the window
    /// over if it has expired.
    pub fn increment(&self, source: &str, action: &'static str, rule: RateLimitRule) {
        let now = self.clock.now_unix();
        self.windows
            .entry((source.to_string(), action))
            .and_modify(|window| {
                if now - window.window_start >= rule.window_secs as i64 {
                    window.count = 1;
                    window.window_start = now;
                } else {
                    window.count += 1;
                }
            })
            .or_insert(Window {
                count: 1,
                window_start: now,
            });
    }

    /// Drop windows that have fully expired under the widest configured
    /// window, bounding memory growth. Called by a periodic sweep task.
    pub fn prune_expired(&self, max_window_secs: u64) {
        let now = self.clock.now_unix();
        self.windows
            .retain(|_, window| now - window.window_start < max_window_secs as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    const RULE: RateLimitRule = RateLimitRule {
        limit: 2,
        window_secs: 60,
    };

    #[test]
    fn allows_up_to_limit_then_refuses() {
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
        let limiter = RateLimiter::new(clock);

        assert!(limiter.check("1.2.3.4", "message", RULE));
        limiter.increment("1.2.3.4", "message", RULE);
        assert!(limiter.check("1.2.3.4", "message", RULE));
        limiter.increment("1.2.3.4", "message", RULE);
        assert!(!limiter.check("1.2.3.4", "message", RULE));
    }

    #[test]
    fn window_resets_after_expiry() {
        let clock = Arc::new(FakeClock::new());
        let limiter = RateLimiter::new(clock.clone());

        limiter.increment("1.2.3.4", "message", RULE);
        limiter.increment("1.2.3.4", "message", RULE);
        assert!(!limiter.check("1.2.3.4", "message", RULE));

        clock.advance(61_000);
        assert!(limiter.check("1.2.3.4", "message", RULE));
    }

    #[test]
    fn distinct_sources_are_independent() {
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
        let limiter = RateLimiter::new(clock);

        limiter.increment("1.2.3.4", "message", RULE);
        limiter.increment("1.2.3.4", "message", RULE);
        assert!(!limiter.check("1.2.3.4", "message", RULE));
        assert!(limiter.check("5.6.7.8", "message", RULE));
    }

    #[test]
    fn check_does_not_mutate_state() {
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
        let limiter = RateLimiter::new(clock);

        for _ in 0..10 {
            limiter.check("1.2.3.4", "message", RULE);
        }
        assert!(limiter.windows.is_empty());
    }
}
