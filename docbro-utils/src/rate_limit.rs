//! ABOUTME: Per-host token-bucket rate limiter (spec §4.F, §5)

use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

struct Bucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(rate_limit: f64) -> Self {
        Self {
            capacity: rate_limit.ceil().max(1.0),
            refill_per_sec: rate_limit,
            tokens: rate_limit.ceil().max(1.0),
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Returns `Some(wait)` if a token isn't available yet, else consumes one.
    fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let deficit = 1.0 - self.tokens;
            Some(Duration::from_secs_f64(deficit / self.refill_per_sec))
        }
    }
}

/// One token bucket per host, each protected by its own lock (spec §5:
/// "Rate-limit token buckets: one per host, protected by a single lock per
/// bucket").
#[derive(Default)]
pub struct HostRateLimiter {
    buckets: DashMap<String, Mutex<Bucket>>,
}

impl HostRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends the caller until a token for `host` is available, at the
    /// given `rate_limit` (req/s). This is a crawler suspension point
    /// (spec §5).
    pub async fn acquire(&self, host: &str, rate_limit: f64) {
        loop {
            let wait = {
                let bucket = self
                    .buckets
                    .entry(host.to_string())
                    .or_insert_with(|| Mutex::new(Bucket::new(rate_limit)));
                bucket.lock().try_acquire()
            };
            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_immediately_within_capacity() {
        let limiter = HostRateLimiter::new();
        let start = Instant::now();
        limiter.acquire("example.com", 10.0).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn second_acquire_past_capacity_waits() {
        let limiter = HostRateLimiter::new();
        // capacity=1 at rate_limit=1.0/s: first is free, second must wait ~1s.
        limiter.acquire("slow.example", 1.0).await;
        let start = Instant::now();
        limiter.acquire("slow.example", 1.0).await;
        assert!(start.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test]
    async fn independent_hosts_have_independent_buckets() {
        let limiter = HostRateLimiter::new();
        limiter.acquire("a.example", 1.0).await;
        let start = Instant::now();
        limiter.acquire("b.example", 1.0).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
