//! Bounded retry policy
//!
//! The policy is plain data; [`RetryPolicy::run`] drives an async operation
//! through it using tokio's timer, so tests with paused time see exact delays.

use std::future::Future;
use std::time::Duration;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// Doubling delay, capped
    Exponential {
        /// Delay before the first retry
        initial: Duration,
        /// Upper bound
        max: Duration,
    },
}

/// Attempt limit plus backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Two attempts, one second apart
    fn default() -> Self {
        Self::fixed(2, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Create policy; at least one attempt is always made
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Fixed-delay policy
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    /// Single attempt, no retry
    #[must_use]
    pub fn none() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Attempt limit
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff schedule
    #[inline]
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Delay before 1-based `attempt`; zero for the first
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let doublings = (attempt - 2).min(31);
                initial.saturating_mul(1 << doublings).min(max)
            }
        }
    }

    /// Run `op` until it succeeds or attempts run out
    ///
    /// `op` receives the 1-based attempt number.
    ///
    /// # Errors
    /// Returns the error of the final attempt
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    let delay = self.delay_before(attempt + 1);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "attempt failed, retrying"
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
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn fixed_schedule() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_secs(1));
        assert_eq!(policy.delay_before(3), Duration::from_secs(1));
    }

    #[test]
    fn exponential_schedule_is_capped() {
        let policy = RetryPolicy::new(
            10,
            Backoff::Exponential {
                initial: Duration::from_millis(100),
                max: Duration::from_millis(500),
            },
        );
        assert_eq!(policy.delay_before(2), Duration::from_millis(100));
        assert_eq!(policy.delay_before(3), Duration::from_millis(200));
        assert_eq!(policy.delay_before(4), Duration::from_millis(400));
        assert_eq!(policy.delay_before(5), Duration::from_millis(500));
        assert_eq!(policy.delay_before(40), Duration::from_millis(500));
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::fixed(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result = policy
            .run(|attempt| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 3 {
                        Err("not yet")
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::fixed(2, Duration::from_secs(1));
        let start = Instant::now();

        let result: Result<(), String> = policy
            .run(|attempt| async move { Err(format!("attempt {attempt} failed")) })
            .await;

        assert_eq!(result, Err("attempt 2 failed".to_string()));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }
}
