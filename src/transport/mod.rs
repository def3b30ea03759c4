//! Rest.li transport layer.
//!
//! [`RestliTransport`] is the seam between the protocol adapter and the wire.
//! [`HttpRestliTransport`] talks to the real API; tests use
//! [`crate::mocks::MockTransport`].

mod encoding;
mod http;

pub use encoding::{encode_entity_key, encode_query, encode_value};
pub use http::HttpRestliTransport;

use crate::errors::RawFailure;
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Rest.li protocol version sent with every request.
pub const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

/// Rest.li method of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestliMethod {
    /// Finder query (`?q=<name>`).
    Finder {
        /// Finder name.
        name: String,
    },
    /// Get a single entity.
    Get,
    /// Get the whole collection.
    GetAll,
    /// Create an entity.
    Create,
    /// Replace an entity.
    Update,
    /// Partially update an entity.
    PartialUpdate,
    /// Delete an entity.
    Delete,
}

impl RestliMethod {
    /// Name used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finder { .. } => "finder",
            Self::Get => "get",
            Self::GetAll => "get_all",
            Self::Create => "create",
            Self::Update => "update",
            Self::PartialUpdate => "partial_update",
            Self::Delete => "delete",
        }
    }
}

/// Credential and version attached to every request.
#[derive(Debug, Clone)]
pub struct RequestAuth {
    /// OAuth access token.
    pub access_token: SecretString,
    /// `LinkedIn-Version` header value (`YYYYMM`).
    pub version: String,
}

/// A single Rest.li request.
#[derive(Debug, Clone)]
pub struct RestliRequest {
    /// Rest.li method.
    pub method: RestliMethod,
    /// Resource path, including the encoded entity key for keyed methods.
    pub resource_path: String,
    /// Query parameters, encoded with Rest.li 2.0 rules by the transport.
    pub query_params: Map<String, Value>,
    /// Request body.
    pub body: Option<Value>,
    /// Credential and version.
    pub auth: RequestAuth,
}

/// Successful response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestliResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body, `Value::Null` when empty.
    pub data: Value,
    /// Response headers with lowercase names.
    pub headers: HashMap<String, String>,
}

impl RestliResponse {
    /// Creates a 200 response with a JSON body.
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            data,
            headers: HashMap::new(),
        }
    }

    /// Creates a 201 response carrying the created entity id.
    pub fn created(id: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("x-restli-id".to_string(), id.into());
        Self {
            status: 201,
            data: Value::Null,
            headers,
        }
    }

    /// Creates a 204 response.
    pub fn no_content() -> Self {
        Self {
            status: 204,
            ..Default::default()
        }
    }

    /// Id of a created entity, from `x-restli-id` or `x-linkedin-id`.
    pub fn created_id(&self) -> Option<&str> {
        self.headers
            .get("x-restli-id")
            .or_else(|| self.headers.get("x-linkedin-id"))
            .map(String::as_str)
    }
}

/// Transport able to execute Rest.li requests.
#[async_trait]
pub trait RestliTransport: Send + Sync {
    /// Performs exactly one remote call.
    async fn send(&self, request: RestliRequest) -> Result<RestliResponse, RawFailure>;
}
