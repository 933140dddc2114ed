//! Integration tests for the HTTP execution endpoint
//!
//! These tests bind the endpoint to a real socket and drive it with a
//! plain HTTP client, covering:
//! - Successful execution and output capture
//! - Request validation and the status code for each rejection
//! - The timeout sentinel response

use std::time::Duration;

use codemcp_common::ExecuteResponse;
use codemcp_endpoint::{CodeRunner, TIMEOUT_MESSAGE};
use serde_json::{json, Value};

use crate::common::{setup_test_logging, spawn_endpoint, spawn_endpoint_with_runner};

async fn post_json(url: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .expect("Request failed")
}

#[tokio::test]
async fn test_bash_execution_over_http() {
    setup_test_logging();
    let url = spawn_endpoint().await;

    let response = post_json(&url, &json!({"code": "echo $((2 + 2))", "language": "bash"})).await;

    assert_eq!(response.status(), 200);
    let body: ExecuteResponse = response.json().await.unwrap();
    assert_eq!(body.stdout, "4\n");
    assert_eq!(body.stderr, "");
    assert_eq!(body.exit_code, 0);
}

#[tokio::test]
async fn test_failing_command_still_returns_ok() {
    setup_test_logging();
    let url = spawn_endpoint().await;

    let response = post_json(
        &url,
        &json!({"code": "echo oops >&2; exit 3", "language": "bash"}),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body: ExecuteResponse = response.json().await.unwrap();
    assert_eq!(body.stdout, "");
    assert_eq!(body.stderr, "oops\n");
    assert_eq!(body.exit_code, 3);
}

#[tokio::test]
async fn test_malformed_json_returns_server_error() {
    setup_test_logging();
    let url = spawn_endpoint().await;

    let response = reqwest::Client::new()
        .post(&url)
        .body("{not json")
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Server error:"), "got {}", message);
}

#[tokio::test]
async fn test_non_object_bodies_are_rejected() {
    setup_test_logging();
    let url = spawn_endpoint().await;

    for body in [json!(null), json!([1, 2]), json!("code")] {
        let response = post_json(&url, &body).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid request body");
    }
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    setup_test_logging();
    let url = spawn_endpoint().await;

    let response = post_json(&url, &json!({"language": "bash"})).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing required field: code");

    let response = post_json(&url, &json!({"code": "echo hi"})).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing required field: language");

    // Empty strings count as missing
    let response = post_json(&url, &json!({"code": "", "language": "bash"})).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing required field: code");
}

#[tokio::test]
async fn test_repeated_requests_agree() {
    setup_test_logging();
    let url = spawn_endpoint().await;
    let request = json!({"code": "echo once; exit 5", "language": "bash"});

    let first: ExecuteResponse = post_json(&url, &request).await.json().await.unwrap();
    let second: ExecuteResponse = post_json(&url, &request).await.json().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.exit_code, 5);
}

#[tokio::test]
async fn test_unsupported_language_is_rejected() {
    setup_test_logging();
    let url = spawn_endpoint().await;

    let response = post_json(&url, &json!({"code": "puts 1", "language": "ruby"})).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unsupported language: ruby");
}

#[tokio::test]
async fn test_timeout_produces_sentinel_response() {
    setup_test_logging();
    let runner = CodeRunner::with_timeout(Duration::from_millis(200));
    let url = spawn_endpoint_with_runner(runner).await;

    let response = post_json(&url, &json!({"code": "sleep 10", "language": "bash"})).await;

    assert_eq!(response.status(), 200);
    let body: ExecuteResponse = response.json().await.unwrap();
    assert_eq!(body.stdout, "");
    assert_eq!(body.stderr, TIMEOUT_MESSAGE);
    assert_eq!(body.exit_code, -1);
}
