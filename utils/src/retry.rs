//! Retry an async operation with a fixed delay between attempts.

use std::fmt;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. `None` retries until success.
    pub max_attempts: Option<NonZeroU32>,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::new(3),
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: Option<NonZeroU32>, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Retry until the operation succeeds.
    #[must_use]
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    fn allows_another(&self, attempts_made: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts_made < max.get())
    }
}

/// Run `op` until it returns `Ok` or the policy's attempts are used up.
///
/// The error of the last attempt is returned when every attempt fails.
pub async fn retrying<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if policy.allows_another(attempt) => {
                debug!(attempt, delay = ?policy.delay, "Attempt failed, retrying: {e}");
                sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// [`retrying`] on a spawned task. Abort the handle to stop retrying.
pub fn spawn_retrying<T, E, F, Fut>(policy: RetryPolicy, op: F) -> JoinHandle<Result<T, E>>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    tokio::spawn(retrying(policy, op))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::time::{Instant, sleep};

    use super::{RetryPolicy, retrying, spawn_retrying};

    fn policy(max: u32) -> RetryPolicy {
        RetryPolicy::new(NonZeroU32::new(max), Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retrying(policy(5), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("fail {n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_with_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retrying(policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("fail {n}")) }
        })
        .await;

        assert_eq!(result, Err("fail 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_attempts() {
        let start = Instant::now();
        let _: Result<(), &str> = retrying(policy(4), || async { Err("nope") }).await;
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_does_not_sleep() {
        let start = Instant::now();
        let result: Result<(), &str> = retrying(policy(1), || async { Err("nope") }).await;
        assert_eq!(result, Err("nope"));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_unbounded_retry_can_be_aborted() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let handle = spawn_retrying(RetryPolicy::unbounded(Duration::from_millis(10)), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("down") }
        });

        sleep(Duration::from_millis(55)).await;
        handle.abort();
        let joined = handle.await;
        assert!(joined.is_err_and(|e| e.is_cancelled()));

        let seen = calls.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several attempts, saw {seen}");
        sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_retry_returns_value() {
        let handle = spawn_retrying(policy(2), || async { Ok::<_, String>(7) });
        assert_eq!(handle.await.expect("join"), Ok(7));
    }
}
