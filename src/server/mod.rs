//! Line-delimited JSON-RPC tool host.
//!
//! Reads one request per line, runs each request on its own task and writes
//! responses back as they complete. Tool failures are reported in-band with
//! `isError: true`; protocol failures use JSON-RPC error objects.

pub mod protocol;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams};

use crate::client::ApiClients;
use crate::tools::ToolRegistry;
use protocol::{INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR};
use serde_json::{json, Value};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Protocol revision reported when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "linkedin-marketing-tools";

/// Dispatches JSON-RPC requests to the tool registry.
#[derive(Debug, Clone)]
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
    clients: Arc<ApiClients>,
}

impl ToolServer {
    /// Creates a server over a registry and the API clients its tools use.
    pub fn new(registry: ToolRegistry, clients: Arc<ApiClients>) -> Self {
        Self {
            registry: Arc::new(registry),
            clients,
        }
    }

    /// Handles one request. Notifications produce no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("unsupported jsonrpc version '{}'", request.jsonrpc),
            ));
        }

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            method if method.starts_with("notifications/") => {
                debug!(method, "Notification received");
                return None;
            }
            method => Err(JsonRpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", method),
            }),
        };

        if request.id.is_none() {
            return None;
        }

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error.code, error.message),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self.registry.list().iter().map(|t| t.definition()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ToolCallParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError {
                code: INVALID_PARAMS,
                message: format!("invalid tools/call params: {}", e),
            })?;

        let (text, is_error) = match self
            .registry
            .call(&params.name, params.arguments, Arc::clone(&self.clients))
            .await
        {
            Ok(output) => (output, false),
            Err(error) => {
                warn!(tool = %params.name, kind = error.kind(), error = %error, "Tool call failed");
                (error.summary(), true)
            }
        };

        Ok(json!({
            "content": [{"type": "text", "text": text}],
            "isError": is_error
        }))
    }

    /// Serves requests from `reader` until end of input.
    ///
    /// Responses are written to `writer` one per line in completion order.
    /// Requests still in flight at end of input are completed before returning.
    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, io::Error>(())
        });

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request = match parse_request(&line) {
                Ok(request) => request,
                Err(response) => {
                    send(&tx, &response);
                    continue;
                }
            };

            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle(request).await {
                    send(&tx, &response);
                }
            });
        }

        drop(tx);
        match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    /// Serves over the process's stdin and stdout.
    pub async fn serve_stdio(self) -> io::Result<()> {
        info!(tools = self.registry.len(), "Serving LinkedIn tools on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

fn parse_request(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
    })?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {}", e))
    })
}

fn send(tx: &mpsc::UnboundedSender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(line) => {
            if tx.send(line).is_err() {
                error!("Response writer closed");
            }
        }
        Err(e) => error!(error = %e, "Could not serialize response"),
    }
}
