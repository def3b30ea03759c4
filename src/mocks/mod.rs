//! Mock transport for testing LinkedIn clients and tools.

use crate::client::{ApiClients, LinkedInClient};
use crate::errors::{RawFailure, ResponseFailure};
use crate::resilience::RetryConfig;
use crate::transport::{RestliMethod, RestliRequest, RestliResponse, RestliTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;

/// Access token used by mock clients.
pub const MOCK_ACCESS_TOKEN: &str = "AQV_mock_access_token_0123456789";

/// Outcome produced by the mock for one call.
pub type MockOutcome = Result<RestliResponse, RawFailure>;

/// A request as seen by the mock transport.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// Rest.li method.
    pub method: RestliMethod,
    /// Resource path including the encoded key.
    pub resource_path: String,
    /// Query parameters.
    pub query_params: serde_json::Map<String, Value>,
    /// Request body.
    pub body: Option<Value>,
    /// `LinkedIn-Version` value.
    pub version: String,
}

impl MockRequest {
    /// Finder name, if this was a finder query.
    pub fn finder(&self) -> Option<&str> {
        match &self.method {
            RestliMethod::Finder { name } => Some(name),
            _ => None,
        }
    }
}

/// Scripted [`RestliTransport`].
///
/// Queued outcomes are consumed in order; once the queue is empty the default
/// outcome is returned for every call.
#[derive(Debug, Clone)]
pub struct MockTransport {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    default_outcome: Arc<Mutex<MockOutcome>>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a mock that answers `200 {}` by default.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            default_outcome: Arc::new(Mutex::new(Ok(RestliResponse::ok(json!({}))))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response.
    pub fn with_response(self, response: RestliResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queues a `200` response with a JSON body.
    pub fn with_json(self, data: Value) -> Self {
        self.with_response(RestliResponse::ok(data))
    }

    /// Queues a failure.
    pub fn with_failure(self, failure: RawFailure) -> Self {
        self.push(Err(failure));
        self
    }

    /// Sets the outcome used once the queue is exhausted.
    pub fn with_default(self, outcome: MockOutcome) -> Self {
        *self.default_outcome.lock() = outcome;
        self
    }

    /// Appends an outcome to the queue.
    pub fn push(&self, outcome: MockOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<MockRequest> {
        self.requests.lock().last().cloned()
    }

    /// Wraps this transport in a single client with the default retry policy.
    pub fn client(&self) -> LinkedInClient {
        self.client_with_retry(RetryConfig::default())
    }

    /// Wraps this transport in a single client with a custom retry policy.
    pub fn client_with_retry(&self, retry: RetryConfig) -> LinkedInClient {
        LinkedInClient::new(
            Arc::new(self.clone()),
            SecretString::new(MOCK_ACCESS_TOKEN.to_string()),
            "202501",
            retry,
        )
    }

    /// Wraps this transport in [`ApiClients`] with no community credential.
    pub fn api_clients(&self) -> Arc<ApiClients> {
        Arc::new(ApiClients::new(self.client(), None))
    }
}

#[async_trait]
impl RestliTransport for MockTransport {
    async fn send(&self, request: RestliRequest) -> Result<RestliResponse, RawFailure> {
        self.requests.lock().push(MockRequest {
            method: request.method,
            resource_path: request.resource_path,
            query_params: request.query_params,
            body: request.body,
            version: request.auth.version,
        });

        let queued = self.outcomes.lock().pop_front();
        match queued {
            Some(outcome) => outcome,
            None => self.default_outcome.lock().clone(),
        }
    }
}

/// A 429 failure with an optional `retry-after` header.
pub fn rate_limited(retry_after: Option<&str>) -> RawFailure {
    let mut response = ResponseFailure::new(429).with_data(json!({
        "status": 429,
        "message": "Too many requests"
    }));
    if let Some(value) = retry_after {
        response = response.with_header("retry-after", value);
    }
    RawFailure::response(response)
}

/// A failure with the given status and LinkedIn error body.
pub fn api_failure(status: u16, message: &str) -> RawFailure {
    RawFailure::response(ResponseFailure::new(status).with_data(json!({
        "status": status,
        "message": message
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LinkedInError;

    #[tokio::test]
    async fn replays_queue_then_default() {
        let mock = MockTransport::new()
            .with_json(json!({"id": 1}))
            .with_default(Err(api_failure(500, "boom")));
        let client = mock.client_with_retry(RetryConfig::disabled());

        assert_eq!(client.fetch_one("/adAccounts", "1").await.unwrap(), json!({"id": 1}));
        let err = client.fetch_one("/adAccounts", "1").await.unwrap_err();
        assert!(matches!(err, LinkedInError::Api { status_code: 500, .. }));
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.last_request().unwrap().version, "202501");
    }
}
