//! Retry policy with exponential backoff for cache fetches.

use lattice_commons::StoreResult;
use lattice_configs::RetrySettings;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// Exponential-backoff retry policy.
///
/// Only errors whose [`StoreError::is_retryable`] is true are retried;
/// `NotFound` and `Validation` are definitive answers and settle
/// immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub attempts: u32,
    /// First delay; doubles per retry.
    pub base_backoff: Duration,
    /// Delay ceiling.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// No retries at all; failures settle on the first attempt.
    pub fn none() -> Self {
        Self {
            attempts: 0,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            attempts: settings.attempts,
            base_backoff: Duration::from_millis(settings.base_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `fetch` through the policy, re-invoking it for a fresh attempt
    /// after each retryable failure.
    pub async fn run<V, F, Fut>(&self, fetch: &F) -> StoreResult<V>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StoreResult<V>>,
    {
        let mut attempt = 0;
        loop {
            match fetch().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        "fetch failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.attempts + 1,
                        delay,
                        err
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
    use lattice_commons::StoreError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            attempts: 5,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(3),
        };
        assert_eq!(policy.backoff_for(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(3));
        assert_eq!(policy.backoff_for(10), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            attempts: 2,
            base_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(100),
        };

        let result: StoreResult<u32> = policy
            .run(&|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(StoreError::backend("flaky"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result: StoreResult<u32> = policy
            .run(&|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StoreError::not_found("customers", "missing-id")) }
            })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_last_error() {
        let policy = RetryPolicy {
            attempts: 2,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        };
        let calls = AtomicU32::new(0);

        let result: StoreResult<u32> = policy
            .run(&|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StoreError::transport("connection reset")) }
            })
            .await;

        assert!(matches!(result, Err(StoreError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
