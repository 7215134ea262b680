//! Token bucket rate limiter for the quote provider.
//!
//! The free Alpha Vantage tier allows only a handful of calls per minute, so
//! every outbound request waits for a token. The limiter delays calls; it
//! never fails them.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// Default rate limit: the Alpha Vantage free tier.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 5;

/// Default bucket capacity (allows a short burst, e.g. quote + search).
pub const DEFAULT_BURST_CAPACITY: f64 = 5.0;

/// Rate limiter configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum requests per minute.
    pub requests_per_minute: u32,
    /// Maximum burst capacity.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            burst_capacity: DEFAULT_BURST_CAPACITY,
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    /// Tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn with_config(config: &RateLimitConfig) -> Self {
        let capacity = config.burst_capacity.max(1.0);
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: f64::from(config.requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Thread-safe token bucket shared by all calls to one provider.
#[derive(Debug)]
pub struct RateLimiter {
    provider: &'static str,
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    pub fn new(provider: &'static str, config: RateLimitConfig) -> Self {
        Self {
            provider,
            bucket: Mutex::new(TokenBucket::with_config(&config)),
        }
    }

    /// Lock the bucket, recovering from poison.
    fn lock_bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!(provider = self.provider, "Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Wait (asynchronously) until a token is available, then take it.
    pub async fn acquire(&self) {
        loop {
            let wait_time = {
                let mut bucket = self.lock_bucket();
                if bucket.try_acquire() {
                    debug!(provider = self.provider, "Rate limiter: acquired token");
                    return;
                }
                bucket.time_until_available()
            };

            if wait_time > Duration::ZERO {
                debug!(
                    provider = self.provider,
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limiter: waiting for token"
                );
                tokio::time::sleep(wait_time).await;
            }
        }
    }

    /// Take a token without waiting. Returns false if rate limited.
    pub fn try_acquire(&self) -> bool {
        self.lock_bucket().try_acquire()
    }

    /// Time until the next token is available.
    pub fn time_until_available(&self) -> Duration {
        self.lock_bucket().time_until_available()
    }

    /// Currently available tokens.
    pub fn remaining_tokens(&self) -> f64 {
        let mut bucket = self.lock_bucket();
        bucket.refill();
        bucket.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(requests_per_minute: u32, burst_capacity: f64) -> RateLimiter {
        RateLimiter::new(
            "TEST",
            RateLimitConfig {
                requests_per_minute,
                burst_capacity,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_exhausted() {
        let limiter = limiter(5, 5.0);
        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
        // 5/min is one token every 12s
        let wait = limiter.time_until_available();
        assert!(wait > Duration::from_secs(11) && wait <= Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_over_time() {
        let limiter = limiter(60, 1.0);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_tokens() {
        let limiter = limiter(5, 5.0);
        limiter.try_acquire();
        limiter.try_acquire();
        assert!((limiter.remaining_tokens() - 3.0).abs() < 0.01);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_acquire_waits_for_refill() {
        let limiter = limiter(60, 2.0);

        limiter.acquire().await;
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    #[test]
    fn test_zero_config_is_clamped() {
        let limiter = limiter(0, 0.0);
        assert!(limiter.try_acquire());
    }
}
