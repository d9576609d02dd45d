//! Per-service token-bucket rate limiting for outbound API calls.
//!
//! Each external service owns an independent bucket. Refill is computed
//! lazily from elapsed time at each acquire; there is no background timer.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// Service names used as bucket keys across the codebase.
pub mod services {
    pub const GITHUB: &str = "github";
    pub const YOUTUBE: &str = "youtube";
    pub const WEBSEARCH: &str = "websearch";
    pub const LLM: &str = "llm";
}

/// Token bucket state for one service.
///
/// `tokens` may go transiently negative: a blocking acquire reserves its
/// tokens up front and sleeps until the deficit would have refilled, which
/// keeps refill + consume a single critical section.
struct TokenBucket {
    /// Maximum tokens the bucket can hold.
    capacity: f64,
    /// Tokens added per `period`.
    rate: f64,
    period: Duration,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(rate: u32, period: Duration) -> Self {
        Self {
            capacity: rate as f64,
            rate: rate as f64,
            period,
            tokens: rate as f64,
            last_refill: Instant::now(),
        }
    }

    /// Adds tokens accrued since the last refill, capped at capacity.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let accrued = elapsed * self.rate / self.period.as_secs_f64();
        self.tokens = (self.tokens + accrued).min(self.capacity);
        self.last_refill = now;
    }

    /// Time for `deficit` tokens to accrue at the bucket's rate.
    fn time_for(&self, deficit: f64) -> Duration {
        Duration::from_secs_f64(deficit * self.period.as_secs_f64() / self.rate)
    }
}

/// Outcome of a single locked refill-and-consume attempt.
enum Acquire {
    Granted,
    Wait(Duration),
    Denied,
}

/// Unified rate limiter holding one independent bucket per external service.
///
/// The bucket set is fixed at construction; `acquire` on an unknown service
/// (or with rate limiting disabled) always permits immediately.
pub struct RateLimiter {
    enabled: bool,
    buckets: HashMap<&'static str, Mutex<TokenBucket>>,
}

impl RateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            buckets: HashMap::new(),
        }
    }

    /// Always-permit limiter for tests and wiring without throttling.
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Registers a bucket allowing `rate` requests per `period`.
    pub fn with_bucket(mut self, service: &'static str, rate: u32, period: Duration) -> Self {
        self.buckets
            .insert(service, Mutex::new(TokenBucket::new(rate, period)));
        self
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        let minute = Duration::from_secs(60);
        Self::new(config.enable_rate_limiting)
            .with_bucket(services::GITHUB, config.github_rate_limit, minute)
            .with_bucket(services::YOUTUBE, config.youtube_rate_limit, minute)
            .with_bucket(services::WEBSEARCH, config.websearch_rate_limit, minute)
            .with_bucket(services::LLM, config.llm_rate_limit, minute)
    }

    /// Acquires `tokens` for `service`.
    ///
    /// Returns true immediately when enough tokens exist. When they do not:
    /// a blocking call reserves the tokens, sleeps exactly the time the
    /// deficit needs to refill (single attempt, no polling), and returns
    /// true; a non-blocking call returns false without consuming.
    pub async fn acquire(&self, service: &str, tokens: u32, blocking: bool) -> bool {
        if !self.enabled {
            return true;
        }
        let Some(bucket) = self.buckets.get(service) else {
            warn!("Unknown rate limit service: {service}");
            return true;
        };

        let outcome = {
            let mut bucket = bucket.lock().expect("rate limit bucket lock poisoned");
            if bucket.rate <= 0.0 {
                // A zero-rate bucket would never refill; treat as unlimited.
                return true;
            }
            bucket.refill(Instant::now());

            let need = tokens as f64;
            if bucket.tokens >= need {
                bucket.tokens -= need;
                Acquire::Granted
            } else if blocking {
                let deficit = need - bucket.tokens;
                bucket.tokens -= need;
                Acquire::Wait(bucket.time_for(deficit))
            } else {
                Acquire::Denied
            }
        };

        match outcome {
            Acquire::Granted => {
                debug!("Rate limit OK for {service}");
                true
            }
            Acquire::Wait(wait) => {
                warn!(
                    "Rate limit exceeded for {service}. Waiting {:.2}s",
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
                true
            }
            Acquire::Denied => {
                warn!("Rate limit exceeded for {service}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(rate: u32, period: Duration) -> RateLimiter {
        RateLimiter::new(true).with_bucket("svc", rate, period)
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_nonblocking_acquires_succeed_then_fail() {
        let limiter = limiter(5, Duration::from_secs(60));

        for _ in 0..5 {
            assert!(limiter.acquire("svc", 1, false).await);
        }
        assert!(!limiter.acquire("svc", 1, false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_after_full_period() {
        let limiter = limiter(5, Duration::from_secs(60));

        for _ in 0..5 {
            assert!(limiter.acquire("svc", 1, false).await);
        }
        assert!(!limiter.acquire("svc", 1, false).await);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.acquire("svc", 1, false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_acquire_waits_for_deficit() {
        let limiter = limiter(60, Duration::from_secs(60));

        for _ in 0..60 {
            assert!(limiter.acquire("svc", 1, false).await);
        }

        // One token accrues per second; the blocking call must sleep ~1s.
        let start = Instant::now();
        assert!(limiter.acquire("svc", 1, true).await);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_nonblocking_acquire_does_not_consume() {
        let limiter = limiter(2, Duration::from_secs(60));

        assert!(limiter.acquire("svc", 1, false).await);
        // Asking for more than remain fails without touching the balance.
        assert!(!limiter.acquire("svc", 2, false).await);
        assert!(limiter.acquire("svc", 1, false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_limiter_always_permits() {
        let limiter = RateLimiter::disabled();
        for _ in 0..1000 {
            assert!(limiter.acquire("svc", 1, false).await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_service_always_permits() {
        let limiter = limiter(1, Duration::from_secs(60));
        assert!(limiter.acquire("other", 1, false).await);
        assert!(limiter.acquire("other", 1, false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_bucket_always_permits() {
        let limiter = RateLimiter::new(true).with_bucket("svc", 0, Duration::from_secs(60));
        for _ in 0..10 {
            assert!(limiter.acquire("svc", 1, true).await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_buckets_are_independent() {
        let limiter = RateLimiter::new(true)
            .with_bucket("a", 1, Duration::from_secs(60))
            .with_bucket("b", 1, Duration::from_secs(60));

        assert!(limiter.acquire("a", 1, false).await);
        assert!(!limiter.acquire("a", 1, false).await);
        // Exhausting "a" leaves "b" untouched.
        assert!(limiter.acquire("b", 1, false).await);
    }
}
