//! Exponential-backoff retry policy for outbound fetches.
//!
//! Authorization failures (401/403) and not-found (404) are never
//! retried: repeating the request cannot change those outcomes.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// First backoff delay.
const BASE_DELAY: Duration = Duration::from_millis(500);
/// Backoff ceiling.
const MAX_DELAY: Duration = Duration::from_secs(8);
/// Total attempts, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// Whether an error is worth retrying.
///
/// Only transport-level failures and 5xx-class responses qualify;
/// everything else (validation, auth, not-found) propagates immediately.
fn is_retryable(err: &Error) -> bool {
    match err {
        Error::Http(e) => {
            if let Some(status) = e.status() {
                status.is_server_error()
            } else {
                // Timeouts, connection resets, DNS failures.
                e.is_timeout() || e.is_connect() || e.is_request()
            }
        }
        _ => false,
    }
}

/// Run `f` with exponential backoff, up to [`MAX_ATTEMPTS`] attempts.
///
/// The final failure is wrapped as [`Error::Network`] naming the
/// operation and attempt count; non-retryable errors pass through
/// untouched on the attempt that produced them.
pub async fn with_retry<T, F, Fut>(op: &'static str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = BASE_DELAY;

    for attempt in 1..=MAX_ATTEMPTS {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) => {
                if attempt == MAX_ATTEMPTS {
                    let source = match err {
                        Error::Http(e) => e,
                        _ => unreachable!("is_retryable only matches Http"),
                    };
                    return Err(Error::Network {
                        op,
                        attempts: attempt,
                        source,
                    });
                }
                warn!("{op} failed (attempt {attempt}/{MAX_ATTEMPTS}): {err}; retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                debug!("{op} failed with non-retryable error: {err}");
                return Err(err);
            }
        }
    }

    unreachable!("retry loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_first_try() {
        let calls = AtomicU32::new(0);
        let result = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Error>(42) }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::NotFound("gone".into())) }
        })
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Auth("expired".into())) }
        })
        .await;
        assert!(matches!(result, Err(Error::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
