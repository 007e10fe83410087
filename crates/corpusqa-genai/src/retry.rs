//! Bounded exponential-backoff retry for remote capability calls.

use corpusqa_core::error::RemoteError;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts on top of the initial try.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }
}

/// Execute an async operation, retrying transient failures with exponential
/// backoff. Permanent failures (auth, parse) return immediately: retrying an
/// invalid credential cannot succeed.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Result<T, RemoteError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if !e.is_transient() || attempt == policy.max_retries {
                    return Err(e);
                }
                let backoff_ms = compute_backoff(policy, attempt, &e);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    backoff_ms,
                    error = %e,
                    "retrying after transient remote error"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                attempt += 1;
            }
        }
    }
}

/// Compute backoff delay, respecting rate-limit retry-after hints.
fn compute_backoff(policy: &RetryPolicy, attempt: u32, err: &RemoteError) -> u64 {
    let computed = compute_exponential_backoff(policy, attempt);
    if let RemoteError::RateLimited { retry_after_secs } = err {
        return (retry_after_secs * 1000).max(computed);
    }
    computed
}

fn compute_exponential_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let base = policy.initial_backoff_ms as f64 * policy.backoff_multiplier.powi(attempt as i32);
    base.min(policy.max_backoff_ms as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 4,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 3000,
            backoff_multiplier: 2.0,
        };
        assert_eq!(compute_exponential_backoff(&policy, 0), 1000);
        assert_eq!(compute_exponential_backoff(&policy, 1), 2000);
        assert_eq!(compute_exponential_backoff(&policy, 2), 3000); // capped
    }

    #[test]
    fn backoff_respects_rate_limit_hint() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 60_000,
            backoff_multiplier: 2.0,
        };
        let err = RemoteError::RateLimited {
            retry_after_secs: 30,
        };
        assert_eq!(compute_backoff(&policy, 0, &err), 30_000);
    }

    #[tokio::test]
    async fn succeeds_on_first_try() {
        let result = with_retry(&fast_policy(3), || async { Ok::<_, RemoteError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = with_retry(&fast_policy(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(RemoteError::Auth {
                    message: "credential rejected".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_error_is_retried_until_exhaustion() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = with_retry(&fast_policy(2), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(RemoteError::Transient {
                    message: "connection reset".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        // 1 initial try + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = with_retry(&fast_policy(3), || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RemoteError::Timeout { timeout_secs: 1 })
                } else {
                    Ok("answer")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "answer");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
