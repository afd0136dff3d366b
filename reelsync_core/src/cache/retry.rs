//! Bounded retry for initial page fetches
//!
//! Interactive queries fail fast so the user sees the error; background
//! widget queries retry a few times before surfacing one.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry class of a query, selecting the attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    /// User is actively waiting (search-as-you-type, detail screens)
    Interactive,
    /// Fills a widget the user is not blocked on
    Background,
}

/// Attempt budget and delay between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no delay
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Whether an error is worth retrying
///
/// Precondition errors are caller bugs and will fail identically on every
/// attempt.
fn retryable(error: &Error) -> bool {
    !matches!(error, Error::Precondition(_))
}

/// Run `op` up to `policy.attempts` times, returning the first success or
/// the last error
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.attempts && retryable(&error) => {
                debug!("attempt {attempt} failed, retrying: {error}");
                attempt += 1;
                if !policy.delay.is_zero() {
                    sleep(policy.delay).await;
                }
            }
            Err(error) => {
                if attempt > 1 {
                    warn!("giving up after {attempt} attempts: {error}");
                }
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, PreconditionError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn flaky(calls: Arc<AtomicU32>, succeed_on: u32) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<u32>> + Send>> {
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= succeed_on {
                    Ok(n)
                } else {
                    Err(BackendError::new(503, "unavailable").into())
                }
            })
        }
    }

    #[tokio::test]
    async fn test_succeeds_within_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let value = with_retry(&policy, flaky(calls.clone(), 3)).await.unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_budget_and_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(2, Duration::ZERO);

        let result = with_retry(&policy, flaky(calls.clone(), 10)).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_interactive_fails_fast() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::none();

        let result = with_retry(&policy, flaky(calls.clone(), 2)).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_precondition_errors_never_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<u32> = with_retry(&policy, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PreconditionError::EmptyQuery.into())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
