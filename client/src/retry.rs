//! HTTP retry policy with exponential backoff.
//!
//! Read-only requests against the remote store are retried here; the core
//! never retries on its own and treats an exhausted outcome as terminal.
//! Writes are deliberately sent once, since the version precondition makes
//! a blind replay of a possibly-committed update ambiguous.
//!
//! Policy: max 2 retries (3 attempts), 500ms initial delay doubling up to
//! 8 seconds, down-jitter up to 25%, `Retry-After` honored when sane. The
//! same idempotency key is sent on every attempt of one logical request.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, header::HeaderMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Down-jitter factor (0.25 = delay shrinks by up to 25%).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.25,
        }
    }
}

impl RetryPolicy {
    /// A policy that performs the initial attempt only.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            jitter_factor: 0.0,
        }
    }
}

/// Parse a `Retry-After` header (integer seconds).
///
/// Values outside `(0, 60s)` are ignored in favor of backoff.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers.get("retry-after")?.to_str().ok()?.parse::<u64>().ok()?;
    let duration = Duration::from_secs(secs);
    if duration > Duration::ZERO && duration < Duration::from_secs(60) {
        Some(duration)
    } else {
        None
    }
}

/// Whether a response status warrants another attempt.
#[must_use]
pub fn should_retry(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}

/// Backoff delay before retry number `backoff_step + 1`.
#[must_use]
pub fn retry_delay(backoff_step: u32, policy: &RetryPolicy, headers: Option<&HeaderMap>) -> Duration {
    if let Some(delay) = headers.and_then(parse_retry_after) {
        return delay;
    }

    let base = policy.initial_delay.as_secs_f64() * 2.0_f64.powi(backoff_step as i32);
    let capped = base.min(policy.max_delay.as_secs_f64());
    let jitter = 1.0 - rand::random::<f64>() * policy.jitter_factor;
    Duration::from_secs_f64(capped * jitter)
}

/// Outcome of a retried request, structurally separating success from the
/// ways a request can end up failed.
#[derive(Debug)]
pub enum RetryOutcome {
    /// 2xx response.
    Success(Response),
    /// Non-2xx response after exhausting retries (body available for
    /// inspection).
    HttpError(Response),
    /// Transport failure after exhausting retries.
    Exhausted { attempts: u32, source: reqwest::Error },
    /// Transport failure that is not worth retrying.
    NonRetryable(reqwest::Error),
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// Send a request with automatic retries.
///
/// `build_request` is invoked once per attempt; every attempt carries the
/// same `Idempotency-Key` header.
pub async fn send_with_retry<F>(build_request: F, policy: &RetryPolicy) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let idempotency_key = format!("tourdesk-retry-{}", Uuid::new_v4());

    for retry_count in 0..=policy.max_retries {
        let last_attempt = retry_count == policy.max_retries;
        let request = build_request().header("Idempotency-Key", &idempotency_key);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return RetryOutcome::Success(response);
                }

                if !last_attempt && should_retry(status) {
                    let delay = retry_delay(retry_count, policy, Some(response.headers()));
                    tracing::debug!(
                        status = %status,
                        retry_count = retry_count + 1,
                        delay_ms = delay.as_millis(),
                        "retrying request after error status"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                return RetryOutcome::HttpError(response);
            }
            Err(e) => {
                if !is_retryable_error(&e) {
                    return RetryOutcome::NonRetryable(e);
                }
                if last_attempt {
                    return RetryOutcome::Exhausted {
                        attempts: retry_count + 1,
                        source: e,
                    };
                }
                let delay = retry_delay(retry_count, policy, None);
                tracing::debug!(
                    error = %e,
                    retry_count = retry_count + 1,
                    delay_ms = delay.as_millis(),
                    "retrying request after connection error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("loop returns on the last attempt")
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn retries_on_503_then_succeeds() {
        let server = MockServer::start().await;
        let attempt = AtomicU32::new(0);

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(move |_: &wiremock::Request| {
                if attempt.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.uri());
        let outcome = send_with_retry(|| client.get(&url), &fast_policy()).await;

        assert!(matches!(outcome, RetryOutcome::Success(_)));
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3) // initial + 2 retries
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.uri());
        let outcome = send_with_retry(|| client.get(&url), &fast_policy()).await;

        match outcome {
            RetryOutcome::HttpError(response) => {
                assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            }
            other => panic!("expected HttpError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_retryable_status_fails_on_first_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.uri());
        let outcome = send_with_retry(|| client.get(&url), &fast_policy()).await;

        assert!(matches!(outcome, RetryOutcome::HttpError(_)));
    }

    #[tokio::test]
    async fn idempotency_key_is_stable_across_attempts() {
        let server = MockServer::start().await;
        let keys = std::sync::Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let sink = keys.clone();

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(move |req: &wiremock::Request| {
                let key = req
                    .headers
                    .get("Idempotency-Key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                sink.lock().unwrap().push(key);
                ResponseTemplate::new(500)
            })
            .expect(3)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.uri());
        let _ = send_with_retry(|| client.get(&url), &fast_policy()).await;

        let seen = keys.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].starts_with("tourdesk-retry-"));
        assert!(seen.iter().all(|k| k == &seen[0]));
    }

    #[tokio::test]
    async fn none_policy_sends_single_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/write"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/write", server.uri());
        let outcome = send_with_retry(|| client.post(&url), &RetryPolicy::none()).await;

        assert!(matches!(outcome, RetryOutcome::HttpError(_)));
    }
}
