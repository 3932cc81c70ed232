//! Retry with linear back-off for backend CRUD calls.
//!
//! The backend's transient failures (flaky connectivity, 5xx) get a small
//! fixed number of retries with a linearly growing delay. Client-side errors
//! and parse failures are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses: transient server/infrastructure errors.
///
/// **Not retriable:**
/// - 4xx statuses — the request itself is wrong; retrying returns the same
///   answer.
/// - [`BackendError::Deserialize`] — malformed response; retrying won't fix it.
/// - [`BackendError::InvalidBaseUrl`] — configuration error.
pub(crate) fn is_retriable(err: &BackendError) -> bool {
    match err {
        BackendError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        BackendError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        BackendError::Deserialize { .. } | BackendError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// Back-off is linear: retry `n` sleeps `base_delay_ms * n`. With
/// `base_delay_ms = 1_000` and `max_retries = 3` the schedule is
/// 1 s, 2 s, 3 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    base_delay_ms: u64,
    mut operation: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = base_delay_ms.saturating_mul(u64::from(attempt));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "backend transient error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn server_error() -> BackendError {
        BackendError::UnexpectedStatus {
            status: 503,
            url: "https://backend.example.test/places".to_owned(),
        }
    }

    fn client_error() -> BackendError {
        BackendError::UnexpectedStatus {
            status: 404,
            url: "https://backend.example.test/places/missing".to_owned(),
        }
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&server_error()));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&client_error()));
    }

    #[test]
    fn deserialize_errors_are_not_retriable() {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        let err = BackendError::Deserialize {
            context: "test".to_owned(),
            source,
        };
        assert!(!is_retriable(&err));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, BackendError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, BackendError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_after_exhausting_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(server_error())
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(BackendError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_client_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(client_error())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "4xx must not be retried");
        assert!(matches!(
            result,
            Err(BackendError::UnexpectedStatus { status: 404, .. })
        ));
    }
}
