//! Drive an MCP session against the gateway in-process
//!
//! Expects a running execution endpoint: start one with
//! `codemcp endpoint`, or point GCF_URL at a deployed function.

use std::path::PathBuf;

use anyhow::Context;
use codemcp_gateway::{GatewayConfig, McpServer, REQUEST_TIMEOUT};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let endpoint_url =
        std::env::var("GCF_URL").unwrap_or_else(|_| "http://127.0.0.1:8080/".to_string());

    let server = McpServer::new(&GatewayConfig {
        endpoint_url: Some(endpoint_url.clone()),
        request_timeout: REQUEST_TIMEOUT,
        deploy_project: None,
        deploy_source_dir: PathBuf::from("./gcf"),
    });

    println!("=== MCP Session Example ===\n");
    println!("Endpoint: {}\n", endpoint_url);

    // Handshake
    let response = send(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }),
    )
    .await?;
    println!(
        "Connected to {} {}",
        response["result"]["serverInfo"]["name"]
            .as_str()
            .unwrap_or_default(),
        response["result"]["serverInfo"]["version"]
            .as_str()
            .unwrap_or_default()
    );
    let _ = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;

    // List the advertised tools
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await?;
    println!("Available tools:");
    for tool in response["result"]["tools"].as_array().into_iter().flatten() {
        println!(
            "  - {}: {}",
            tool["name"].as_str().unwrap_or_default(),
            tool["description"].as_str().unwrap_or_default()
        );
    }

    // Example 1: Python
    println!("\nExample 1: Python");
    run_code(&server, 3, "print('Hello from Python!')\nprint(2 + 2)", "python").await?;

    // Example 2: JavaScript
    println!("\nExample 2: JavaScript");
    run_code(
        &server,
        4,
        "console.log('Hello from JavaScript!');\nconsole.log(6 * 7);",
        "javascript",
    )
    .await?;

    // Example 3: Bash
    println!("\nExample 3: Bash");
    run_code(&server, 5, "echo \"Hello from Bash!\"\necho $((3 + 4))", "bash").await?;

    // Example 4: A snippet that does not compile
    println!("\nExample 4: Syntax error");
    run_code(&server, 6, "print('Unclosed string", "python").await?;

    Ok(())
}

async fn run_code(server: &McpServer, id: i64, code: &str, language: &str) -> anyhow::Result<()> {
    let response = send(
        server,
        json!({
            "jsonrpc": "2.0", "id": id, "method": "tools/call",
            "params": {"name": "run_code", "arguments": {"code": code, "language": language}}
        }),
    )
    .await?;

    match response["result"]["content"][0]["text"].as_str() {
        Some(text) => println!("{}", text),
        None => println!(
            "Call failed: {}",
            response["error"]["message"].as_str().unwrap_or_default()
        ),
    }
    Ok(())
}

async fn send(server: &McpServer, frame: Value) -> anyhow::Result<Value> {
    let response = server
        .handle_line(&frame.to_string())
        .await
        .context("Expected a response frame")?;
    Ok(serde_json::to_value(&response)?)
}
