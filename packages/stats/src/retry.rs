//! Bounded retry for statistics API requests.
//!
//! The retry loop is the only control flow around a fetch: each attempt
//! either succeeds, fails transiently (logged as a warning, retried), or
//! fails terminally. Exhausting the bound yields
//! [`StatsError::RetriesExhausted`] as a value — callers decide how to
//! surface it; nothing here aborts the process.

use std::time::Duration;

use crate::StatsError;

/// Maximum number of attempts per logical fetch, including the first.
pub const MAX_ATTEMPTS: u32 = 2;

/// Runs `operation` up to [`MAX_ATTEMPTS`] times.
///
/// The closure receives the 1-based attempt number. Transient failures
/// (see [`StatsError::is_transient`]) are logged and retried after a
/// short backoff; non-transient failures return immediately.
///
/// # Errors
///
/// Returns the first non-transient error, or
/// [`StatsError::RetriesExhausted`] once the bound is spent.
pub async fn with_retries<T, F, Fut>(label: &str, operation: F) -> Result<T, StatsError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T, StatsError>>,
{
    let mut last_failure = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            let delay = Duration::from_secs(1u64 << (attempt - 1));
            log::warn!("{label}: retry {attempt}/{MAX_ATTEMPTS} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                log::warn!("{label}: attempt {attempt}/{MAX_ATTEMPTS} failed: {e}");
                last_failure = e.to_string();
            }
            Err(e) => return Err(e),
        }
    }

    Err(StatsError::RetriesExhausted {
        attempts: MAX_ATTEMPTS,
        last: last_failure,
    })
}

/// Sends an HTTP request built by `build_request` and parses the response
/// body as JSON, with bounded retry.
///
/// The closure is called on each attempt to construct a fresh
/// [`reqwest::RequestBuilder`], since builders are consumed by `send()`.
/// Connection errors, timeouts, body/decode errors, and non-2xx statuses
/// all count as transient failures.
///
/// # Errors
///
/// Returns [`StatsError::RetriesExhausted`] once the attempt bound is
/// spent.
pub async fn post_json<F>(label: &str, build_request: F) -> Result<serde_json::Value, StatsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    with_retries(label, |_attempt| async {
        let response = build_request().send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status(status));
        }

        Ok(response.json().await?)
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn recovers_after_single_transient_failure() {
        let attempts = AtomicU32::new(0);

        let result = with_retries("test", |_| {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    Err(StatsError::Status(reqwest::StatusCode::BAD_GATEWAY))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_bound_when_every_attempt_fails() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), StatsError> = with_retries("test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(StatsError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)) }
        })
        .await;

        assert!(matches!(
            result,
            Err(StatsError::RetriesExhausted { attempts: n, .. }) if n == MAX_ATTEMPTS
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_contract_failures() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), StatsError> = with_retries("test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StatsError::Contract {
                    field: "raw".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(StatsError::Contract { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_needs_no_retry() {
        let attempts = AtomicU32::new(0);

        let result = with_retries("test", |attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Ok(attempt) }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
