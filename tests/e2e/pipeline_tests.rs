//! End-to-end tests for the full gateway-to-endpoint pipeline
//!
//! A real execution endpoint is started in-process and the MCP server is
//! fed raw frames, exactly as a stdio client would send them.

use std::path::PathBuf;
use std::time::Duration;

use codemcp_gateway::{GatewayConfig, McpServer};
use serde_json::{json, Value};

use crate::common::{setup_test_logging, spawn_endpoint};

async fn connected_gateway() -> McpServer {
    let url = spawn_endpoint().await;
    McpServer::new(&GatewayConfig {
        endpoint_url: Some(url),
        request_timeout: Duration::from_secs(40),
        deploy_project: None,
        deploy_source_dir: PathBuf::from("./gcf"),
    })
}

async fn handle(server: &McpServer, frame: Value) -> Value {
    let response = server
        .handle_line(&frame.to_string())
        .await
        .expect("Expected a response frame");
    serde_json::to_value(&response).unwrap()
}

fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected a text block")
}

#[tokio::test]
async fn test_full_session_with_bash() {
    setup_test_logging();
    let server = connected_gateway().await;

    let response = handle(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }),
    )
    .await;
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "code-interpreter");

    let notified = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(notified.is_none());

    let response = handle(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    assert_eq!(response["result"]["tools"][0]["name"], "run_code");

    let response = handle(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "run_code", "arguments": {"code": "echo $((2 + 2))", "language": "bash"}}
        }),
    )
    .await;
    assert_eq!(response["id"], 3);
    assert_eq!(tool_text(&response), "4");
}

#[tokio::test]
async fn test_failing_command_renders_errors_block() {
    setup_test_logging();
    let server = connected_gateway().await;

    let response = handle(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "run_code", "arguments": {"code": "echo boom >&2; exit 7", "language": "bash"}}
        }),
    )
    .await;

    assert_eq!(tool_text(&response), "Errors:\nboom\n\n\nExit code: 7");
}

#[tokio::test]
async fn test_unsupported_language_is_surfaced() {
    setup_test_logging();
    let server = connected_gateway().await;

    let response = handle(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "run_code", "arguments": {"code": "puts 1", "language": "ruby"}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32603);
    let message = response["error"]["message"].as_str().unwrap();
    assert!(
        message.contains("Unsupported language: ruby"),
        "got {}",
        message
    );
}

#[tokio::test]
#[ignore] // Requires a python interpreter on PATH
async fn test_full_session_with_python() {
    setup_test_logging();
    let server = connected_gateway().await;

    let response = handle(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "run_code", "arguments": {"code": "print(2 + 2)", "language": "python"}}
        }),
    )
    .await;

    assert_eq!(tool_text(&response), "4");
}

#[tokio::test]
#[ignore] // Requires a node interpreter on PATH
async fn test_full_session_with_javascript() {
    setup_test_logging();
    let server = connected_gateway().await;

    let response = handle(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "run_code", "arguments": {"code": "console.log(6 * 7)", "language": "javascript"}}
        }),
    )
    .await;

    assert_eq!(tool_text(&response), "42");
}
