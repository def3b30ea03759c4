//! Protocol adapter tests over the mock transport.

use linkedin_marketing_tools::errors::LinkedInError;
use linkedin_marketing_tools::mocks::{api_failure, rate_limited, MockTransport};
use linkedin_marketing_tools::transport::{RestliMethod, RestliResponse};
use linkedin_marketing_tools::RetryConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::Instant;

fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_rate_limit_then_success() {
    let mock = MockTransport::new()
        .with_failure(rate_limited(None))
        .with_json(json!({"id": 123, "name": "Acme"}));
    let client = mock.client();
    let start = Instant::now();

    let account = client.fetch_one("/adAccounts", "123").await.unwrap();

    assert_eq!(account, json!({"id": 123, "name": "Acme"}));
    assert_eq!(mock.call_count(), 2);
    let elapsed = elapsed_ms(start);
    assert!((1000..1005).contains(&elapsed), "elapsed {}ms", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_header_sets_delay() {
    let mock = MockTransport::new()
        .with_failure(rate_limited(Some("1")))
        .with_json(json!({"id": 123}));
    let client = mock.client();
    let start = Instant::now();

    client.fetch_one("/adAccounts", "123").await.unwrap();

    assert_eq!(mock.call_count(), 2);
    let elapsed = elapsed_ms(start);
    assert!((1000..1005).contains(&elapsed), "elapsed {}ms", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_rate_limit_exhausts_retries() {
    let mock = MockTransport::new().with_default(Err(rate_limited(None)));
    let client = mock.client();
    let start = Instant::now();

    let error = client.fetch_one("/adAccounts", "123").await.unwrap_err();

    assert!(matches!(error, LinkedInError::RateLimit { .. }));
    assert_eq!(mock.call_count(), 4);
    let elapsed = elapsed_ms(start);
    assert!((7000..7005).contains(&elapsed), "elapsed {}ms", elapsed);

    let metrics = client.metrics();
    assert_eq!(metrics.requests_total, 1);
    assert_eq!(metrics.requests_failed, 1);
    assert_eq!(metrics.requests_rate_limited, 1);
}

#[tokio::test(start_paused = true)]
async fn test_authentication_failure_is_not_retried() {
    let mock = MockTransport::new().with_failure(api_failure(401, "Invalid access token"));
    let client = mock.client();
    let start = Instant::now();

    let error = client.fetch_one("/adAccounts", "123").await.unwrap_err();

    assert_eq!(
        error,
        LinkedInError::Authentication {
            message: "Invalid access token".to_string()
        }
    );
    assert_eq!(mock.call_count(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_disabled_retries_surface_first_rate_limit() {
    let mock = MockTransport::new().with_default(Err(rate_limited(Some("30"))));
    let client = mock.client_with_retry(RetryConfig::disabled());

    let error = client.fetch_one("/adAccounts", "1").await.unwrap_err();

    assert_eq!(error.retry_after_seconds(), Some(30));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_query_sends_finder_and_params() {
    let mock = MockTransport::new().with_json(json!({"elements": []}));
    let client = mock.client();

    let params = fields(json!({"pageSize": 10, "search": {"status": {"values": ["ACTIVE"]}}}));
    client.query("/adAccounts", "search", Some(params.clone())).await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.finder(), Some("search"));
    assert_eq!(request.resource_path, "/adAccounts");
    assert_eq!(request.query_params, params);
    assert_eq!(request.body, None);
    assert_eq!(request.version, "202501");
}

#[tokio::test]
async fn test_query_without_params_sends_empty_map() {
    let mock = MockTransport::new();
    mock.client().query("/adTargetingFacets", "all", None).await.unwrap();

    let request = mock.last_request().unwrap();
    assert!(request.query_params.is_empty());
}

#[tokio::test]
async fn test_fetch_one_encodes_urn_keys() {
    let mock = MockTransport::new();
    mock.client()
        .fetch_one("/posts", "urn:li:share:7000")
        .await
        .unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, RestliMethod::Get);
    assert_eq!(request.resource_path, "/posts/urn%3Ali%3Ashare%3A7000");
}

#[tokio::test]
async fn test_fetch_all_uses_collection_path() {
    let mock = MockTransport::new();
    mock.client().fetch_all("/adTargetingFacets").await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, RestliMethod::GetAll);
    assert_eq!(request.resource_path, "/adTargetingFacets");
}

#[tokio::test]
async fn test_create_returns_header_id() {
    let mock = MockTransport::new().with_response(RestliResponse::created("987654"));
    let entity = fields(json!({"name": "Spring launch", "status": "PAUSED"}));

    let created = mock
        .client()
        .create("/adAccounts/1/adCampaigns", entity.clone())
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("987654"));
    assert_eq!(created.data, Value::Null);
    let request = mock.last_request().unwrap();
    assert_eq!(request.method, RestliMethod::Create);
    assert_eq!(request.body, Some(Value::Object(entity)));
}

#[tokio::test]
async fn test_patch_sends_nested_patch_set() {
    let mock = MockTransport::new().with_response(RestliResponse::no_content());
    let changes = fields(json!({"status": "ACTIVE", "runSchedule.end": 1735689600000u64}));

    mock.client()
        .patch("/adAccounts/1/adCampaigns", "55", changes)
        .await
        .unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, RestliMethod::PartialUpdate);
    assert_eq!(request.resource_path, "/adAccounts/1/adCampaigns/55");
    assert_eq!(
        request.body,
        Some(json!({
            "$set": {"status": "ACTIVE"},
            "runSchedule": {"$set": {"end": 1735689600000u64}}
        }))
    );
}

#[tokio::test]
async fn test_empty_patch_is_rejected_before_sending() {
    let mock = MockTransport::new();

    let error = mock
        .client()
        .patch("/adAccounts/1/adCampaigns", "55", Map::new())
        .await
        .unwrap_err();

    assert_eq!(error.kind(), "validation");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_replace_and_remove() {
    let mock = MockTransport::new();
    let client = mock.client();

    client
        .replace("/adAccounts", "1", fields(json!({"name": "Renamed"})))
        .await
        .unwrap();
    client.remove("/adAccounts/1/adCampaigns", "2").await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, RestliMethod::Update);
    assert_eq!(requests[0].resource_path, "/adAccounts/1");
    assert_eq!(requests[1].method, RestliMethod::Delete);
    assert_eq!(requests[1].resource_path, "/adAccounts/1/adCampaigns/2");
    assert_eq!(requests[1].body, None);
}

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let mock = MockTransport::new()
        .with_json(json!({}))
        .with_failure(api_failure(404, "Not found"));
    let client = mock.client();

    client.fetch_one("/adAccounts", "1").await.unwrap();
    client.fetch_one("/adAccounts", "2").await.unwrap_err();

    let metrics = client.metrics();
    assert_eq!(metrics.requests_total, 2);
    assert_eq!(metrics.requests_success, 1);
    assert_eq!(metrics.requests_failed, 1);
    assert_eq!(metrics.requests_rate_limited, 0);
}
