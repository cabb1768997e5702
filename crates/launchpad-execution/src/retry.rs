use launchpad_core::analysis::AnalysisError;
use launchpad_core::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential back-off for analysis calls.
///
/// Only retryable errors are retried. The delay before retry `n` (0-based) is
/// `base * 2^n`, raised to the provider's `retry-after` hint when one is
/// given, and capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Back-off before the retry following failed attempt `retry` (0-based).
    pub fn delay_for(&self, retry: u32, error: &AnalysisError) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry));
        let delay = match error.retry_after() {
            Some(hint) => exponential.max(hint),
            None => exponential,
        };
        delay.min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails permanently or runs out of attempts.
    ///
    /// # Returns
    ///
    /// The first success, or the last error seen.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, AnalysisError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnalysisError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt - 1, &error);
                    tracing::warn!(
                        "[RetryPolicy] Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.max_delay())
    }
}
