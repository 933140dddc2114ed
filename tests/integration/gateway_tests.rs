//! Integration tests for the MCP gateway against a mock execution endpoint
//!
//! wiremock stands in for the HTTP endpoint so these tests can pin down
//! exactly what the gateway sends and how it folds responses, delays and
//! failures into tool results.

use std::path::PathBuf;
use std::time::Duration;

use assert_matches::assert_matches;
use codemcp_common::{JsonRpcRequest, JsonRpcResponse};
use codemcp_gateway::{GatewayConfig, McpServer};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::setup_test_logging;

fn gateway_for(url: &str) -> McpServer {
    McpServer::new(&GatewayConfig {
        endpoint_url: Some(url.to_string()),
        request_timeout: Duration::from_secs(5),
        deploy_project: None,
        deploy_source_dir: PathBuf::from("./gcf"),
    })
}

async fn call_run_code(server: &McpServer, code: &str, language: &str) -> JsonRpcResponse {
    server
        .handle_request(JsonRpcRequest::new(
            "call-1",
            "tools/call",
            json!({"name": "run_code", "arguments": {"code": code, "language": language}}),
        ))
        .await
}

fn tool_text(response: &JsonRpcResponse) -> String {
    let result = response.result.as_ref().expect("Expected a result");
    assert_eq!(result["content"][0]["type"], "text");
    result["content"][0]["text"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_tool_call_forwards_request_and_renders_stdout() {
    setup_test_logging();
    let endpoint = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({"code": "print(2 + 2)", "language": "python"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stdout": "4\n",
            "stderr": "",
            "exitCode": 0
        })))
        .expect(1)
        .mount(&endpoint)
        .await;

    let server = gateway_for(&endpoint.uri());
    let response = call_run_code(&server, "print(2 + 2)", "python").await;

    assert_matches!(response.error, None);
    assert_eq!(tool_text(&response), "4");
}

#[tokio::test]
async fn test_tool_call_renders_errors_and_exit_code() {
    setup_test_logging();
    let endpoint = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stdout": "",
            "stderr": "boom",
            "exitCode": 2
        })))
        .mount(&endpoint)
        .await;

    let server = gateway_for(&endpoint.uri());
    let response = call_run_code(&server, "boom()", "python").await;

    assert_eq!(tool_text(&response), "Errors:\nboom\n\nExit code: 2");
}

#[tokio::test]
async fn test_endpoint_failure_status_becomes_internal_error() {
    setup_test_logging();
    let endpoint = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error: kaboom"))
        .mount(&endpoint)
        .await;

    let server = gateway_for(&endpoint.uri());
    let response = call_run_code(&server, "print(1)", "python").await;

    let error = response.error.expect("Expected an error");
    assert_eq!(error.code, -32603);
    assert!(
        error.message.contains("Execution endpoint returned 500"),
        "got {}",
        error.message
    );
    assert!(error.message.contains("kaboom"), "got {}", error.message);
}

#[tokio::test]
async fn test_invalid_endpoint_payload_becomes_internal_error() {
    setup_test_logging();
    let endpoint = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&endpoint)
        .await;

    let server = gateway_for(&endpoint.uri());
    let response = call_run_code(&server, "print(1)", "python").await;

    let error = response.error.expect("Expected an error");
    assert_eq!(error.code, -32603);
    assert!(
        error
            .message
            .contains("Invalid response from execution endpoint"),
        "got {}",
        error.message
    );
}

#[tokio::test]
async fn test_slow_endpoint_hits_request_timeout() {
    setup_test_logging();
    let endpoint = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"stdout": "late\n", "stderr": "", "exitCode": 0}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&endpoint)
        .await;

    let server = McpServer::new(&GatewayConfig {
        endpoint_url: Some(endpoint.uri()),
        request_timeout: Duration::from_millis(200),
        deploy_project: None,
        deploy_source_dir: PathBuf::from("./gcf"),
    });
    let response = call_run_code(&server, "print(1)", "python").await;

    let error = response.error.expect("Expected an error");
    assert_eq!(error.code, -32603);
    assert!(
        error.message.contains("Execution endpoint unreachable"),
        "got {}",
        error.message
    );
}
