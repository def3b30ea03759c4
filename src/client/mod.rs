//! LinkedIn protocol adapter.
//!
//! [`LinkedInClient`] turns a verb plus resource identity into a
//! [`RestliRequest`] and runs it through the [`RetryExecutor`]. It adds no error
//! handling of its own.

mod patch;

pub use patch::build_patch_set;

use crate::config::LinkedInConfig;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::observability::{Metrics, MetricsSnapshot};
use crate::resilience::{RetryConfig, RetryExecutor};
use crate::transport::{
    encode_entity_key, HttpRestliTransport, RequestAuth, RestliMethod, RestliRequest,
    RestliResponse, RestliTransport,
};
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Result of a create call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEntity {
    /// Id reported in `x-restli-id`, as sent by the server (may be a URN).
    pub id: Option<String>,
    /// Returned representation, `Value::Null` when the server sends none.
    pub data: Value,
}

/// Client bound to one credential.
#[derive(Clone)]
pub struct LinkedInClient {
    transport: Arc<dyn RestliTransport>,
    auth: RequestAuth,
    retry: RetryExecutor,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for LinkedInClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedInClient")
            .field("version", &self.auth.version)
            .field("retry", self.retry.config())
            .finish_non_exhaustive()
    }
}

impl LinkedInClient {
    /// Creates a client over `transport` with the given credential.
    pub fn new(
        transport: Arc<dyn RestliTransport>,
        access_token: SecretString,
        version: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            auth: RequestAuth {
                access_token,
                version: version.into(),
            },
            retry: RetryExecutor::new(retry),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Protocol version sent with every call.
    pub fn version(&self) -> &str {
        &self.auth.version
    }

    /// Snapshot of this client's request counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Runs a finder query. `params` defaults to an empty map.
    pub async fn query(
        &self,
        resource_path: &str,
        query_name: &str,
        params: Option<Map<String, Value>>,
    ) -> LinkedInResult<Value> {
        let method = RestliMethod::Finder {
            name: query_name.to_string(),
        };
        let response = self
            .send(method, resource_path.to_string(), params.unwrap_or_default(), None)
            .await?;
        Ok(response.data)
    }

    /// Fetches a single entity at `{resource_path}/{id}`.
    pub async fn fetch_one(&self, resource_path: &str, id: &str) -> LinkedInResult<Value> {
        let response = self
            .send(RestliMethod::Get, entity_path(resource_path, id), Map::new(), None)
            .await?;
        Ok(response.data)
    }

    /// Fetches a whole collection without filtering.
    pub async fn fetch_all(&self, resource_path: &str) -> LinkedInResult<Value> {
        let response = self
            .send(RestliMethod::GetAll, resource_path.to_string(), Map::new(), None)
            .await?;
        Ok(response.data)
    }

    /// Creates an entity and returns the created representation.
    pub async fn create(
        &self,
        resource_path: &str,
        entity: Map<String, Value>,
    ) -> LinkedInResult<CreatedEntity> {
        let response = self
            .send(
                RestliMethod::Create,
                resource_path.to_string(),
                Map::new(),
                Some(Value::Object(entity)),
            )
            .await?;

        Ok(CreatedEntity {
            id: response.created_id().map(String::from),
            data: response.data,
        })
    }

    /// Replaces a whole entity.
    pub async fn replace(
        &self,
        resource_path: &str,
        id: &str,
        entity: Map<String, Value>,
    ) -> LinkedInResult<()> {
        self.send(
            RestliMethod::Update,
            entity_path(resource_path, id),
            Map::new(),
            Some(Value::Object(entity)),
        )
        .await?;
        Ok(())
    }

    /// Partially updates an entity. Keys may use dotted paths (`runSchedule.end`).
    pub async fn patch(
        &self,
        resource_path: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> LinkedInResult<()> {
        let patch_set = build_patch_set(&fields)?;
        self.send(
            RestliMethod::PartialUpdate,
            entity_path(resource_path, id),
            Map::new(),
            Some(patch_set),
        )
        .await?;
        Ok(())
    }

    /// Deletes an entity.
    pub async fn remove(&self, resource_path: &str, id: &str) -> LinkedInResult<()> {
        self.send(RestliMethod::Delete, entity_path(resource_path, id), Map::new(), None)
            .await?;
        Ok(())
    }

    async fn send(
        &self,
        method: RestliMethod,
        resource_path: String,
        query_params: Map<String, Value>,
        body: Option<Value>,
    ) -> LinkedInResult<RestliResponse> {
        let operation = format!("{} {}", method.as_str(), resource_path);
        let request_id = Uuid::new_v4();
        let request = RestliRequest {
            method,
            resource_path,
            query_params,
            body,
            auth: self.auth.clone(),
        };

        self.metrics.record_request();
        tracing::debug!(request_id = %request_id, operation = %operation, "LinkedIn call started");
        let result = self
            .retry
            .execute(&operation, || {
                let transport = Arc::clone(&self.transport);
                let request = request.clone();
                async move { transport.send(request).await }
            })
            .await;

        match &result {
            Ok(_) => self.metrics.record_success(),
            Err(error) => {
                tracing::debug!(
                    request_id = %request_id,
                    operation = %operation,
                    kind = error.kind(),
                    error = %error,
                    "LinkedIn call failed"
                );
                self.metrics
                    .record_failure(matches!(error, LinkedInError::RateLimit { .. }));
            }
        }

        result
    }
}

fn entity_path(resource_path: &str, id: &str) -> String {
    format!(
        "{}/{}",
        resource_path.trim_end_matches('/'),
        encode_entity_key(id)
    )
}

/// The clients available to tool handlers.
///
/// Advertising tools use the primary credential. Page and post tools use the
/// Community Management credential when one is configured.
#[derive(Debug, Clone)]
pub struct ApiClients {
    marketing: LinkedInClient,
    community: Option<LinkedInClient>,
}

impl ApiClients {
    /// Pairs a primary client with an optional community client.
    pub fn new(marketing: LinkedInClient, community: Option<LinkedInClient>) -> Self {
        Self {
            marketing,
            community,
        }
    }

    /// Builds HTTP-backed clients from configuration.
    pub fn from_config(config: &LinkedInConfig) -> Result<Self, reqwest::Error> {
        let transport: Arc<dyn RestliTransport> =
            Arc::new(HttpRestliTransport::new(config.base_url(), config.timeout())?);
        Ok(Self::with_transport(config, transport))
    }

    /// Builds clients from configuration over an arbitrary transport.
    pub fn with_transport(config: &LinkedInConfig, transport: Arc<dyn RestliTransport>) -> Self {
        let marketing = LinkedInClient::new(
            Arc::clone(&transport),
            config.access_token().clone(),
            config.api_version(),
            config.retry().clone(),
        );
        let community = config.community_access_token().map(|token| {
            LinkedInClient::new(
                Arc::clone(&transport),
                token.clone(),
                config.api_version(),
                config.retry().clone(),
            )
        });

        Self::new(marketing, community)
    }

    /// Client for advertising endpoints.
    pub fn marketing(&self) -> &LinkedInClient {
        &self.marketing
    }

    /// Client for organization and post endpoints.
    pub fn community(&self) -> &LinkedInClient {
        self.community.as_ref().unwrap_or(&self.marketing)
    }

    /// Whether a separate community credential is configured.
    pub fn has_community_credential(&self) -> bool {
        self.community.is_some()
    }
}
