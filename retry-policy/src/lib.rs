//! Bounded exponential-backoff execution for fallible async operations.
//!
//! The executor runs a nullary async operation, classifies each failure as
//! transient or fatal via [`RetryClass`], and retries transient failures with
//! a doubling delay capped at `max_backoff`. Fatal failures and exhausted
//! retries propagate the last error unchanged.

use std::time::Duration;

use tracing::{debug, warn};

/// Classification hook: decides whether an error is worth retrying.
///
/// Implementations should prefer typed categories from the underlying client
/// (e.g. `reqwest::Error::is_timeout` / `is_connect`) and fall back to
/// [`message_looks_transient`] for everything else.
pub trait RetryClass {
    /// `true` for network/timeout/DNS/connection-class failures.
    fn is_transient(&self) -> bool;
}

/// Retry parameters for one logical operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for the doubled delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Single place for the substring heuristic over failure messages.
///
/// Inherently fragile; kept isolated here so callers can migrate to typed
/// error categories without touching the retry loop.
pub fn message_looks_transient(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    ["timeout", "connection", "network", "dns"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Executes `op` with the given policy.
///
/// Attempts are counted from 1. A transient failure with
/// `attempt > max_retries` (or any fatal failure) propagates the error
/// unchanged, so the operation runs at most `max_retries + 1` times. The
/// delay sequence is `min(initial * 2^k, max_backoff)`, no jitter.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    op_name: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClass + std::fmt::Display,
{
    let mut attempt: u32 = 1;
    let mut delay = policy.initial_backoff;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op = op_name, attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !err.is_transient() {
                    warn!(op = op_name, attempt, error = %err, "fatal failure, not retrying");
                    return Err(err);
                }
                if attempt > policy.max_retries {
                    warn!(
                        op = op_name,
                        attempt,
                        max_retries = policy.max_retries,
                        error = %err,
                        "retries exhausted"
                    );
                    return Err(err);
                }

                warn!(
                    op = op_name,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off"
                );

                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_backoff);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use thiserror::Error;

    #[derive(Debug, Error)]
    enum FakeError {
        #[error("connection reset by peer")]
        Transient,
        #[error("401 unauthorized")]
        Fatal,
    }

    impl RetryClass for FakeError {
        fn is_transient(&self) -> bool {
            matches!(self, FakeError::Transient)
        }
    }

    fn policy(max_retries: u32, initial_secs: u64, max_secs: u64) -> RetryPolicy {
        RetryPolicy::new(
            max_retries,
            Duration::from_secs(initial_secs),
            Duration::from_secs(max_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_runs_max_retries_plus_one_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), FakeError> = run_with_retry(&policy(3, 1, 30), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_up_to_cap() {
        let started = tokio::time::Instant::now();

        let result: Result<(), FakeError> = run_with_retry(&policy(3, 1, 2), "op", || async {
            Err(FakeError::Transient)
        })
        .await;

        assert!(result.is_err());
        // Delays: 1s, then 2s, then 2s (capped). Paused time auto-advances.
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_runs_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), FakeError> = run_with_retry(&policy(3, 1, 30), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::Fatal)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<u32, FakeError> = run_with_retry(&policy(3, 1, 30), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err(FakeError::Transient) } else { Ok(42) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_propagates_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), FakeError> = run_with_retry(&policy(0, 1, 30), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn substring_classification_is_case_insensitive() {
        assert!(message_looks_transient("Connection refused"));
        assert!(message_looks_transient("operation TIMEOUT after 30s"));
        assert!(message_looks_transient("dns resolution failed"));
        assert!(message_looks_transient("network unreachable"));
        assert!(!message_looks_transient("invalid api key"));
    }
}
