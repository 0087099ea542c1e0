//! "Continue wait" retry policy
//!
//! The reporting API answers a query it has not finished preparing with a
//! `Continue wait` sentinel instead of data. Callers resend the same request
//! until real data arrives or the policy gives up.

use crate::config::RetryConfig;
use crate::domain::{CubeApiError, Result};
use std::future::Future;
use std::time::Duration;

/// Outcome of a single request attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// The server answered with a final result
    Ready(T),
    /// The server is still preparing the result
    StillProcessing,
}

/// Bounds and pacing for "Continue wait" retries
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts before giving up, `None` retries forever
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::from_config(config)
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
        }
    }

    /// Retry immediately and without limit
    pub fn immediate() -> Self {
        Self {
            max_attempts: None,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Give up after `attempts` total attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Pause before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = retry.saturating_sub(1).min(32) as i32;
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let delay_ms = (self.initial_delay.as_millis() as f64 * factor)
            .min(self.max_delay.as_millis() as f64);

        Duration::from_millis(delay_ms as u64)
    }

    /// Whether another attempt is allowed after `attempts` have been made
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    /// Run `operation` until it yields a final result
    ///
    /// Errors from the operation are returned immediately; only the
    /// still-processing outcome is retried.
    ///
    /// # Errors
    ///
    /// Returns [`CubeApiError::StillProcessing`] once the attempt limit is
    /// reached, or the first error the operation produces.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            match operation().await? {
                Attempt::Ready(value) => {
                    if attempts > 1 {
                        tracing::debug!(attempts = attempts, "Query ready after waiting");
                    }
                    return Ok(value);
                }
                Attempt::StillProcessing => {
                    if !self.allows_another(attempts) {
                        tracing::warn!(
                            attempts = attempts,
                            "Giving up on query still processing"
                        );
                        return Err(CubeApiError::StillProcessing { attempts }.into());
                    }

                    let delay = self.delay_for(attempts);
                    tracing::debug!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Query still processing, retrying"
                    );

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CubexError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_default_policy_is_unbounded_and_immediate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, None);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
        assert!(policy.allows_another(u32::MAX - 1));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: Some(10),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        };

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for(5), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(50), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_retries_until_ready() {
        let calls = AtomicU32::new(0);

        let value = RetryPolicy::immediate()
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Ok(Attempt::StillProcessing)
                } else {
                    Ok(Attempt::Ready(n))
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let err = RetryPolicy::immediate()
            .with_max_attempts(4)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CubexError>(Attempt::<()>::StillProcessing)
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CubexError::CubeApi(CubeApiError::StillProcessing { attempts: 4 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let err = RetryPolicy::immediate()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Attempt<()>, _>(CubexError::from(CubeApiError::QueryFailed(
                    "bad member".into(),
                )))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CubexError::CubeApi(CubeApiError::QueryFailed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
