//! HTTP surface of the execution endpoint
//!
//! One route, `POST /`, mirroring the deployed cloud function: field
//! validation problems come back as 400s, execution-time failures are
//! normal 200 responses with a -1 exit code, and anything unexpected at
//! the handler level is a 500.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use codemcp_common::{ErrorBody, ExecuteResponse, Language};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::runner::{CodeRunner, ExecutionOutcome, Executor};

/// Stderr text reported when an execution exceeds its budget.
pub const TIMEOUT_MESSAGE: &str = "Code execution timed out after 30 seconds";

pub fn router() -> Router {
    router_with_runner(CodeRunner::new())
}

/// Router over a caller-supplied runner. Tests inject short-budget or
/// failing runners here.
pub fn router_with_runner<R: Executor>(runner: R) -> Router {
    Router::new()
        .route("/", post(execute::<R>))
        .with_state(Arc::new(runner))
}

/// Binds `addr` and serves the endpoint until the process exits.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind HTTP server")?;
    info!("Execution endpoint listening on {}", listener.local_addr()?);
    serve_on(listener, CodeRunner::new()).await
}

/// Serves on an already-bound listener. Lets tests pick an ephemeral port
/// and learn the address before starting the server.
pub async fn serve_on<R: Executor>(listener: TcpListener, runner: R) -> Result<()> {
    axum::serve(listener, router_with_runner(runner))
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn execute<R: Executor>(State(runner): State<Arc<R>>, body: Bytes) -> Response {
    // The body is decoded by hand: undecodable bytes are a handler-level
    // fault (500), while a readable-but-wrong shape is the caller's
    // mistake (400).
    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            error!("Unreadable request body: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server error: {}", e),
            );
        }
    };

    let Some(fields) = parsed.as_object() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body".to_string());
    };

    let code = match required_field(fields, "code") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let language = match required_field(fields, "language") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let language = match Language::from_str(language) {
        Ok(language) => language,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let response = match runner.run(language, code).await {
        ExecutionOutcome::Completed {
            stdout,
            stderr,
            exit_code,
        } => ExecuteResponse {
            stdout,
            stderr,
            exit_code,
        },
        ExecutionOutcome::TimedOut => ExecuteResponse {
            stdout: String::new(),
            stderr: TIMEOUT_MESSAGE.to_string(),
            exit_code: -1,
        },
        ExecutionOutcome::SpawnFailed { message } => {
            error!("Execution error: {}", message);
            ExecuteResponse {
                stdout: String::new(),
                stderr: format!("Execution error: {}", message),
                exit_code: -1,
            }
        }
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// A required field must be present, a string, and non-empty. All three
/// violations report the same way.
fn required_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a str, Response> {
    match fields.get(name).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing required field: {}", name),
        )),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}
