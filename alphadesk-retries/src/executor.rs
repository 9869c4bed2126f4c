//! Retry executor for running operations with per-attempt deadlines.

use crate::config::RetryConfig;
use alphadesk_core::{ClientError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// State of a retry run.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    /// Current attempt number (1-indexed).
    pub attempt: u32,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total time spent waiting between attempts.
    pub total_wait_time: Duration,
    /// History of attempts.
    pub history: Vec<AttemptInfo>,
}

/// Information about a single attempt.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempt number.
    pub attempt: u32,
    /// Whether it succeeded.
    pub success: bool,
    /// Whether the attempt hit its deadline.
    pub timed_out: bool,
    /// Error message if failed.
    pub error: Option<String>,
    /// Time waited after this attempt.
    pub wait_time: Duration,
}

/// Execute an operation with retries.
///
/// Each attempt runs under `config.attempt_timeout`; when the deadline
/// elapses the attempt's future is dropped, which aborts the request, and the
/// failure is reported as a network timeout. Only network-class failures are
/// retried. Anything else, including authentication rejections, returns
/// immediately.
///
/// # Example
///
/// ```ignore
/// use alphadesk_retries::{with_retry, RetryConfig};
///
/// let config = RetryConfig::for_login();
/// let response = with_retry(&config, || client.post(url).json(&body).send_classified()).await?;
/// ```
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_retry_state(config, operation).await.0
}

/// Execute with retries and get state information.
pub async fn with_retry_state<F, Fut, T>(
    config: &RetryConfig,
    mut operation: F,
) -> (Result<T>, RetryState)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut state = RetryState::default();
    let max_attempts = config.max_attempts.max(1);

    loop {
        state.attempt += 1;

        debug!(
            attempt = state.attempt,
            max_attempts, "Executing retry attempt"
        );

        let (outcome, timed_out) = run_attempt(config, operation()).await;

        match outcome {
            Ok(result) => {
                state.history.push(AttemptInfo {
                    attempt: state.attempt,
                    success: true,
                    timed_out: false,
                    error: None,
                    wait_time: Duration::ZERO,
                });
                return (Ok(result), state);
            }
            Err(error) => {
                let should_retry = state.attempt < max_attempts && error.is_network();
                let wait = if should_retry {
                    config.wait.calculate(state.attempt)
                } else {
                    Duration::ZERO
                };

                state.last_error = Some(error.to_string());
                state.history.push(AttemptInfo {
                    attempt: state.attempt,
                    success: false,
                    timed_out,
                    error: Some(error.to_string()),
                    wait_time: wait,
                });

                if !should_retry {
                    warn!(
                        attempt = state.attempt,
                        error = %error,
                        "Retry exhausted or error not retryable"
                    );
                    return (Err(error), state);
                }

                state.total_wait_time += wait;
                debug!(
                    attempt = state.attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %error,
                    "Waiting before retry"
                );

                sleep(wait).await;
            }
        }
    }
}

async fn run_attempt<Fut, T>(config: &RetryConfig, attempt: Fut) -> (Result<T>, bool)
where
    Fut: Future<Output = Result<T>>,
{
    match config.attempt_timeout {
        Some(limit) => match timeout(limit, attempt).await {
            Ok(outcome) => (outcome, false),
            Err(_) => (
                Err(ClientError::timeout(format!(
                    "request timed out after {} ms",
                    limit.as_millis()
                ))),
                true,
            ),
        },
        None => (attempt.await, false),
    }
}

/// Builder for retry operations.
pub struct Retry<'a> {
    config: &'a RetryConfig,
}

impl<'a> Retry<'a> {
    /// Create a new retry builder.
    pub fn new(config: &'a RetryConfig) -> Self {
        Self { config }
    }

    /// Run the operation with retries.
    pub async fn run<F, Fut, T>(self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        with_retry(self.config, operation).await
    }

    /// Run and get state.
    pub async fn run_with_state<F, Fut, T>(self, operation: F) -> (Result<T>, RetryState)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        with_retry_state(self.config, operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphadesk_core::NetworkErrorKind;
    use rstest::rstest;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn refused() -> ClientError {
        ClientError::network(NetworkErrorKind::Connect, "connection refused")
    }

    #[tokio::test]
    async fn test_with_retry_immediate_success() {
        let config = RetryConfig::new();
        let result = with_retry(&config, || async { Ok::<_, ClientError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let config = RetryConfig::for_login();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(refused())
                } else {
                    Ok("logged in")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "logged in");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_exactly_three_attempts() {
        let config = RetryConfig::for_login();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        let started = Instant::now();

        let result = with_retry(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(refused())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_network());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // two backoff waits, none after the final attempt
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(4500), "{elapsed:?}");
    }

    #[rstest]
    #[case::wrong_password(|| ClientError::auth("wrong password"))]
    #[case::session_expired(|| ClientError::Unauthorized)]
    #[case::server_error(|| ClientError::api(500, "internal error"))]
    #[case::bad_body(|| ClientError::Decode("expected value".into()))]
    #[tokio::test]
    async fn test_non_network_error_not_retried(#[case] make_error: fn() -> ClientError) {
        let config = RetryConfig::new().fixed(Duration::from_millis(1));
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        let expected = make_error().to_string();

        let result = with_retry(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(make_error())
            }
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), expected);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    #[tokio::test(start_paused = true)]
    async fn test_attempt_budget_is_exact(#[case] max_attempts: u32) {
        let config = RetryConfig::new()
            .max_attempts(max_attempts)
            .fixed(Duration::from_millis(100));
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let (result, state) = with_retry_state(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(refused())
            }
        })
        .await;

        assert!(result.unwrap_err().is_network());
        assert_eq!(attempts.load(Ordering::SeqCst), max_attempts);
        assert_eq!(state.history.len(), max_attempts as usize);
        assert_eq!(
            state.total_wait_time,
            Duration::from_millis(100) * (max_attempts - 1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_classified_as_network_timeout() {
        let config = RetryConfig::new()
            .max_attempts(1)
            .attempt_timeout(Duration::from_secs(15));

        let result = with_retry(&config, || async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, ClientError>("too late")
        })
        .await;

        match result.unwrap_err() {
            ClientError::Network { kind, .. } => assert_eq!(kind, NetworkErrorKind::Timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_attempt_is_retried_fresh() {
        let config = RetryConfig::for_login();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let (result, state) = with_retry_state(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    // cold backend: first attempt hangs past the deadline
                    sleep(Duration::from_secs(30)).await;
                }
                Ok::<_, ClientError>(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(state.attempt, 2);
        assert!(state.history[0].timed_out);
        assert_eq!(state.history[0].wait_time, Duration::from_millis(1500));
        assert!(state.history[1].success);
    }

    #[tokio::test]
    async fn test_retry_state() {
        let config = RetryConfig::new().fixed(Duration::from_millis(1));
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let (result, state) = with_retry_state(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 1 {
                    Err(refused())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(state.attempt, 2);
        assert_eq!(state.history.len(), 2);
        assert!(!state.history[0].success);
        assert!(state.history[1].success);
        assert_eq!(state.total_wait_time, Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_retry_builder() {
        let config = RetryConfig::new();
        let result = Retry::new(&config)
            .run(|| async { Ok::<_, ClientError>("success") })
            .await;

        assert_eq!(result.unwrap(), "success");
    }
}
