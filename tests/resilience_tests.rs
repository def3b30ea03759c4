//! Tests for the error classifier and the retry executor.

use linkedin_marketing_tools::errors::{classify, LinkedInError, RawFailure, ResponseFailure};
use linkedin_marketing_tools::mocks::{api_failure, rate_limited};
use linkedin_marketing_tools::resilience::{RetryConfig, RetryExecutor};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;
use tokio::time::Instant;

fn millis_since(start: Instant) -> u128 {
    start.elapsed().as_millis()
}

#[test]
fn test_classification_is_idempotent() {
    let failures = vec![
        rate_limited(Some("5")),
        api_failure(401, "Invalid access token"),
        api_failure(403, "Not enough permissions"),
        api_failure(500, "Internal error"),
        RawFailure::Message("connection reset".to_string()),
        RawFailure::Opaque("42".to_string()),
        RawFailure::Classified(LinkedInError::invalid("bad input")),
    ];

    for failure in failures {
        let once = classify(failure);
        let twice = classify(RawFailure::Classified(once.clone()));
        assert_eq!(once, twice);
    }
}

#[test_case(401, "authentication" ; "unauthorized")]
#[test_case(403, "permission" ; "forbidden")]
#[test_case(429, "rate_limit" ; "too many requests")]
#[test_case(400, "api" ; "bad request")]
#[test_case(404, "api" ; "not found")]
#[test_case(500, "api" ; "server error")]
#[test_case(503, "api" ; "unavailable")]
fn test_status_code_mapping(status: u16, kind: &str) {
    let error = classify(api_failure(status, "failed"));
    assert_eq!(error.kind(), kind);
    assert_eq!(error.status_code(), Some(status));
}

#[test]
fn test_failures_without_status_are_transport_errors() {
    let error = classify(RawFailure::Message("dns lookup failed".to_string()));
    assert_eq!(
        error,
        LinkedInError::Transport {
            message: "dns lookup failed".to_string()
        }
    );
    assert_eq!(error.status_code(), None);
    assert!(!error.is_retryable());
}

#[test]
fn test_generic_api_error_carries_details() {
    let body = json!({"status": 422, "code": "FIELD_INVALID", "message": "name too long"});
    let error = classify(RawFailure::response(
        ResponseFailure::new(422).with_data(body.clone()),
    ));

    assert_eq!(
        error,
        LinkedInError::Api {
            message: "name too long".to_string(),
            status_code: 422,
            error_code: Some("FIELD_INVALID".to_string()),
            details: Some(body),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_takes_precedence() {
    let executor = RetryExecutor::new(RetryConfig::default());
    let call_count = Arc::new(AtomicUsize::new(0));
    let count = call_count.clone();
    let start = Instant::now();

    let result = executor
        .execute("test", || {
            let c = count.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited(Some("3")))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result, Ok("done"));
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    // 3s + 3s, not 1s + 2s.
    let elapsed = millis_since(start);
    assert!((6000..6005).contains(&elapsed), "elapsed {}ms", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_sequence() {
    let executor = RetryExecutor::new(RetryConfig::default());
    let attempts = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let seen = attempts.clone();
    let start = Instant::now();

    let result: Result<(), LinkedInError> = executor
        .execute("test", || {
            let seen = seen.clone();
            async move {
                seen.lock().push(start.elapsed().as_millis());
                Err(rate_limited(None))
            }
        })
        .await;

    assert!(matches!(result, Err(LinkedInError::RateLimit { .. })));
    let attempts = attempts.lock().clone();
    assert_eq!(attempts.len(), 4);
    let gaps: Vec<u128> = attempts.windows(2).map(|w| w[1] - w[0]).collect();
    for (gap, expected) in gaps.iter().zip([1000u128, 2000, 4000]) {
        assert!((expected..expected + 5).contains(gap), "gap {}ms, expected {}ms", gap, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_ceiling_is_four_attempts() {
    let executor = RetryExecutor::new(RetryConfig::default());
    let call_count = Arc::new(AtomicUsize::new(0));
    let count = call_count.clone();

    let result: Result<(), LinkedInError> = executor
        .execute("test", || {
            let c = count.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited(Some("1")))
            }
        })
        .await;

    assert_eq!(call_count.load(Ordering::SeqCst), 4);
    assert_eq!(result.unwrap_err().retry_after_seconds(), Some(1));
}

#[test_case(api_failure(401, "expired") ; "authentication")]
#[test_case(api_failure(403, "scope") ; "permission")]
#[test_case(api_failure(500, "boom") ; "server error")]
#[test_case(api_failure(404, "missing") ; "not found")]
#[test_case(RawFailure::Message("timeout".to_string()) ; "transport")]
#[test_case(RawFailure::Classified(LinkedInError::invalid("bad")) ; "validation")]
#[tokio::test(start_paused = true)]
async fn test_no_retry_on_other_errors(failure: RawFailure) {
    let executor = RetryExecutor::new(RetryConfig::default());
    let call_count = Arc::new(AtomicUsize::new(0));
    let count = call_count.clone();
    let start = Instant::now();

    let result: Result<(), LinkedInError> = executor
        .execute("test", || {
            let c = count.clone();
            let failure = failure.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(failure)
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_one_rate_limit() {
    let executor = RetryExecutor::new(RetryConfig::default());
    let call_count = Arc::new(AtomicUsize::new(0));
    let count = call_count.clone();
    let start = Instant::now();

    let result = executor
        .execute("test", || {
            let c = count.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(rate_limited(None))
                } else {
                    Ok(json!({"id": 123}))
                }
            }
        })
        .await;

    assert_eq!(result, Ok(json!({"id": 123})));
    assert_eq!(call_count.load(Ordering::SeqCst), 2);
    let elapsed = millis_since(start);
    assert!((1000..1005).contains(&elapsed), "elapsed {}ms", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_custom_initial_backoff() {
    let executor = RetryExecutor::new(RetryConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(10),
    });
    let call_count = Arc::new(AtomicUsize::new(0));
    let count = call_count.clone();
    let start = Instant::now();

    let result: Result<(), LinkedInError> = executor
        .execute("test", || {
            let c = count.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited(None))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    let elapsed = millis_since(start);
    assert!((30..35).contains(&elapsed), "elapsed {}ms", elapsed);
}
