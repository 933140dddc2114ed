//! MCP server over stdio

use anyhow::Result;
use codemcp_common::{
    CallToolResult, ExecuteRequest, Implementation, InitializeResult, JsonRpcMessage,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, Tool,
    ToolsCapability, MCP_PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, warn};

use crate::client::EndpointClient;
use crate::config::{EndpointResolver, GatewayConfig};
use crate::render::render_output;

/// Name the server reports in the initialize handshake.
pub const SERVER_NAME: &str = "code-interpreter";
/// The single tool this gateway advertises.
pub const TOOL_NAME: &str = "run_code";

const TOOL_DESCRIPTION: &str = "Execute code in a sandboxed environment";

pub struct McpServer {
    client: EndpointClient,
    resolver: EndpointResolver,
}

impl McpServer {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: EndpointClient::with_timeout(config.request_timeout),
            resolver: EndpointResolver::from_config(config),
        }
    }

    /// Serves the protocol over this process's stdio until EOF or ctrl-c.
    /// Stdout carries protocol frames only; all logging goes elsewhere.
    pub async fn run_stdio(&self) -> Result<()> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut writer = BufWriter::new(tokio::io::stdout());
        let mut line = String::new();

        info!(
            "{} v{} serving MCP on stdio",
            SERVER_NAME,
            env!("CARGO_PKG_VERSION")
        );

        loop {
            line.clear();
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
                read = reader.read_line(&mut line) => {
                    match read {
                        Ok(0) => {
                            info!("Input closed, shutting down");
                            break;
                        }
                        Ok(_) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            if let Some(response) = self.handle_line(&line).await {
                                let payload = serde_json::to_string(&response)?;
                                writer.write_all(payload.as_bytes()).await?;
                                writer.write_all(b"\n").await?;
                                writer.flush().await?;
                            }
                        }
                        Err(e) => {
                            error!("Failed to read from stdin: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Handles one line from the transport. `None` means nothing is
    /// written back: notifications, response frames, unparseable input.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: JsonRpcMessage = match serde_json::from_str(line.trim()) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping non-protocol input: {}", e);
                return None;
            }
        };

        match message {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request).await),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification).await;
                None
            }
            JsonRpcMessage::Response(_) => {
                warn!("Ignoring unexpected response frame");
                None
            }
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling request: {}", request.method);

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(json!({
                "code": -32601,
                "message": format!("Method not found: {}", request.method)
            })),
        };

        match result {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => JsonRpcResponse::error(
                request.id,
                error["code"].as_i64().unwrap_or(-32603) as i32,
                error["message"].as_str().unwrap_or("Internal error"),
            ),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        debug!("Handling notification: {}", notification.method);

        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                info!("Session initialized");
                if !self.resolver.is_configured() {
                    warn!("No execution endpoint configured; one will be deployed on first tool call");
                }
            }
            other => {
                warn!("Unknown notification method: {}", other);
            }
        }
    }

    fn handle_initialize(&self) -> Result<Value, Value> {
        info!("Handling initialize request");

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: Implementation::new(SERVER_NAME, env!("CARGO_PKG_VERSION")),
            instructions: Some(
                "Executes Python, JavaScript and Bash snippets on a remote execution endpoint"
                    .to_string(),
            ),
        };

        Ok(serde_json::to_value(result).unwrap())
    }

    fn handle_tools_list(&self) -> Result<Value, Value> {
        info!("Handling tools/list request");

        let tools = vec![Tool {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "The code to execute"
                    },
                    "language": {
                        "type": "string",
                        "description": "Programming language (python, javascript, bash)",
                        "enum": ["python", "javascript", "bash"]
                    }
                },
                "required": ["code", "language"]
            }),
        }];

        Ok(json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, Value> {
        let params = params.ok_or_else(|| {
            json!({
                "code": -32602,
                "message": "Missing params"
            })
        })?;

        let tool_name = params["name"].as_str().ok_or_else(|| {
            json!({
                "code": -32602,
                "message": "Missing tool name"
            })
        })?;

        if tool_name != TOOL_NAME {
            return Err(json!({
                "code": -32602,
                "message": format!("Unknown tool: {}", tool_name)
            }));
        }

        let arguments = &params["arguments"];
        if arguments.as_object().map_or(true, |map| map.is_empty()) {
            return Err(json!({
                "code": -32602,
                "message": "Missing arguments"
            }));
        }

        // Presence is checked here; whether the language is actually
        // supported is the endpoint's call, so the two layers cannot
        // disagree about the table.
        let code = arguments["code"].as_str().unwrap_or_default();
        let language = arguments["language"].as_str().unwrap_or_default();
        if code.is_empty() || language.is_empty() {
            return Err(json!({
                "code": -32602,
                "message": "Missing required arguments: code and language"
            }));
        }

        self.run_code(code, language).await
    }

    /// Forwards one execution to the endpoint and renders the result as a
    /// single text block.
    async fn run_code(&self, code: &str, language: &str) -> Result<Value, Value> {
        info!("Calling tool: {} ({})", TOOL_NAME, language);

        let url = match self.resolver.resolve().await {
            Ok(url) => url,
            Err(e) => {
                error!("Endpoint resolution failed: {:#}", e);
                return Err(json!({
                    "code": -32603,
                    "message": format!("{:#}", e)
                }));
            }
        };

        let request = ExecuteRequest::new(code, language);
        match self.client.execute(url, &request).await {
            Ok(response) => {
                let result = CallToolResult::text(render_output(&response));
                Ok(serde_json::to_value(result).unwrap())
            }
            Err(e) => {
                error!("Tool call failed: {:#}", e);
                Err(json!({
                    "code": -32603,
                    "message": format!("{:#}", e)
                }))
            }
        }
    }
}
