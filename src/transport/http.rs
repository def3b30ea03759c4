//! reqwest-backed Rest.li transport.

use super::encoding::encode_query;
use super::{RestliMethod, RestliRequest, RestliResponse, RestliTransport, RESTLI_PROTOCOL_VERSION};
use crate::errors::{RawFailure, ResponseFailure};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Rest.li transport over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpRestliTransport {
    http: Client,
    base_url: String,
}

impl HttpRestliTransport {
    /// Creates a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Creates a transport around an existing reqwest client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, request: &RestliRequest) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = request.resource_path.trim_start_matches('/');

        let mut params = request.query_params.clone();
        if let RestliMethod::Finder { name } = &request.method {
            params.insert("q".to_string(), Value::String(name.clone()));
        }

        let query = encode_query(&params);
        if query.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}?{}", base, path, query)
        }
    }

    fn http_method(method: &RestliMethod) -> Method {
        match method {
            RestliMethod::Finder { .. } | RestliMethod::Get | RestliMethod::GetAll => Method::GET,
            RestliMethod::Create | RestliMethod::PartialUpdate => Method::POST,
            RestliMethod::Update => Method::PUT,
            RestliMethod::Delete => Method::DELETE,
        }
    }

    fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl RestliTransport for HttpRestliTransport {
    async fn send(&self, request: RestliRequest) -> Result<RestliResponse, RawFailure> {
        let url = self.build_url(&request);
        let method = Self::http_method(&request.method);

        debug!(
            method = %method,
            restli_method = request.method.as_str(),
            url = %url,
            "Sending LinkedIn request"
        );

        let mut builder = self
            .http
            .request(method, &url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", request.auth.access_token.expose_secret()),
            )
            .header("LinkedIn-Version", &request.auth.version)
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL_VERSION)
            .header(ACCEPT, "application/json");

        let body = match request.method {
            RestliMethod::PartialUpdate => {
                builder = builder.header("X-RestLi-Method", "PARTIAL_UPDATE");
                Some(json!({ "patch": request.body.unwrap_or_else(|| json!({})) }))
            }
            _ => request.body,
        };

        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RawFailure::Message(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = Self::collect_headers(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RawFailure::Message(e.to_string()))?;

        let data = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        if !(200..300).contains(&status) {
            let failure = ResponseFailure {
                status,
                data,
                headers,
            };
            return Err(RawFailure::response(failure));
        }

        Ok(RestliResponse {
            status,
            data,
            headers,
        })
    }
}
