//! Bounded retry-with-backoff wrapper for fallible async operations.
//!
//! Deliberately generic: every external call site (LLM, GitHub, YouTube,
//! web search) composes this identically, passing its own predicate for
//! which errors are worth retrying.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry configuration. `max_retries` counts additional attempts after the
/// first, so the total attempt count is `max_retries + 1`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Runs `f`, retrying on errors matched by `retry_if`.
    ///
    /// The n-th retry sleeps `base_delay * backoff_multiplier^n` (n starting
    /// at 0). Non-matching errors propagate immediately; once retries are
    /// exhausted, the last error propagates unchanged.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        retry_if: impl Fn(&E) -> bool,
        mut f: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && retry_if(&err) => {
                    let delay = self
                        .base_delay
                        .mul_f64(self.backoff_multiplier.powi(attempt as i32));
                    warn!(
                        "{label}: attempt {}/{} failed: {err}. Retrying in {:.1}s",
                        attempt + 1,
                        self.max_retries + 1,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient"),
                TestError::Fatal => write!(f, "fatal"),
            }
        }
    }

    fn retryable(err: &TestError) -> bool {
        matches!(err, TestError::Transient)
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result: Result<u32, TestError> = policy
            .run("test op", retryable, || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_makes_exactly_one_attempt() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result: Result<u32, TestError> = policy
            .run("test op", retryable, || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            })
            .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_propagate_last_error() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
        };
        let attempts = AtomicU32::new(0);

        let result: Result<u32, TestError> = policy
            .run("test op", retryable, || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;

        assert!(matches!(result, Err(TestError::Transient)));
        // 1 initial attempt + 2 retries
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_grow_exponentially() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        };
        let start = tokio::time::Instant::now();

        let _: Result<u32, TestError> = policy
            .run("test op", retryable, || async { Err(TestError::Transient) })
            .await;

        // Sleeps: 1s (attempt 0) + 2s (attempt 1) = 3s total.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}
