//! Stdio tool server.
//!
//! Reads one JSON-RPC request per line and writes one response per line.
//! Stdout carries only protocol traffic; logs go to stderr.

pub mod protocol;
pub mod tools;

use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::error::ConnectorError;
use crate::search::{Geocoder, PropertySearchService, SearchBackend, SearchIntent};
use protocol::{error_codes, JsonRpcRequest, JsonRpcResponse};

const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeocodeArgs {
    location: String,
}

pub struct ToolServer<G, B> {
    service: Arc<PropertySearchService<G, B>>,
}

impl<G, B> ToolServer<G, B>
where
    G: Geocoder,
    B: SearchBackend,
{
    pub fn new(service: Arc<PropertySearchService<G, B>>) -> Self {
        Self { service }
    }

    /// Handle one raw line. `None` means nothing should be written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Unparseable request: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };
        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                "jsonrpc must be \"2.0\"",
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id.clone(),
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "ping" => JsonRpcResponse::success(id.clone(), json!({})),
            "tools/list" => JsonRpcResponse::success(
                id.clone(),
                json!({ "tools": tools::get_tool_definitions() }),
            ),
            "tools/call" => self.handle_tools_call(id.clone(), request.params).await,
            method if method.starts_with("notifications/") => {
                debug!("Notification: {}", method);
                return None;
            }
            method => JsonRpcResponse::error(
                id.clone(),
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        };

        // Requests without an id are notifications and get no reply
        id.as_ref().map(|_| response)
    }

    async fn handle_tools_call(
        &self,
        id: Option<protocol::JsonRpcId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let call: ToolCallParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(call)) => call,
            Ok(None) => {
                return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, "Missing params")
            }
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                )
            }
        };
        let arguments = call.arguments.unwrap_or_else(|| json!({}));

        info!("Tool call: {}", call.name);

        let outcome = match call.name.as_str() {
            tools::SEARCH_PROPERTIES => {
                match parse_arguments::<SearchIntent>(arguments) {
                    Ok(intent) => self.service.search(intent).await.map(|result| {
                        let listing = serde_json::to_string_pretty(&result.properties)
                            .unwrap_or_else(|_| "[]".to_string());
                        tool_result(vec![result.summary(), listing], json!(result))
                    }),
                    Err(err) => Err(err),
                }
            }
            tools::TEMPLATE_PARAMS => self.service.template_parameters().await.map(|params| {
                tool_result(vec![params.summary()], json!(params))
            }),
            tools::GEOCODE_LOCATION => {
                match parse_arguments::<GeocodeArgs>(arguments) {
                    Ok(args) => self.service.geocode(&args.location).await.map(|point| {
                        tool_result(
                            vec![format!(
                                "Geocoded '{}' to: {{\"latitude\": {}, \"longitude\": {}}}",
                                args.location, point.latitude, point.longitude
                            )],
                            json!(point),
                        )
                    }),
                    Err(err) => Err(err),
                }
            }
            other => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {}", other),
                )
            }
        };

        let result = outcome.unwrap_or_else(|err| tool_failure(&call.name, &err));
        JsonRpcResponse::success(id, result)
    }

    /// Serve until the reader reaches EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(|e| {
                error!("Failed to read request: {}", e);
                anyhow::anyhow!("read error: {}", e)
            })?;

            if bytes_read == 0 {
                info!("Input closed, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!("Received: {}", trimmed);

            let Some(response) = self.handle_line(trimmed).await else {
                continue;
            };

            let response_json = serde_json::to_string(&response)?;
            debug!("Sending: {}", response_json);

            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<()> {
        info!("Server ready, waiting for requests on stdin");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }
}

fn tool_result(texts: Vec<String>, data: Value) -> Value {
    let content: Vec<Value> = texts
        .into_iter()
        .map(|text| json!({ "type": "text", "text": text }))
        .collect();
    json!({
        "content": content,
        "structuredContent": data,
        "isError": false
    })
}

fn tool_failure(tool: &str, err: &ConnectorError) -> Value {
    match err {
        ConnectorError::SearchExecutionError(_) => error!("{} failed: {}", tool, err),
        _ => warn!("{} failed: {}", tool, err),
    }
    json!({
        "content": [{ "type": "text", "text": format!("Error: {}", err) }],
        "structuredContent": {
            "error": { "kind": err.kind(), "message": err.to_string() }
        },
        "isError": true
    })
}

/// Malformed tool arguments are a caller error the client can correct
fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> crate::error::Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ConnectorError::invalid("arguments", e.to_string()))
}
