//! Common test utilities shared across integration and E2E tests

use codemcp_endpoint::{serve_on, CodeRunner};
use tokio::net::TcpListener;

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Starts an execution endpoint in-process on an ephemeral port and
/// returns the URL it serves on.
pub async fn spawn_endpoint() -> String {
    spawn_endpoint_with_runner(CodeRunner::new()).await
}

pub async fn spawn_endpoint_with_runner(runner: CodeRunner) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(serve_on(listener, runner));
    format!("http://{}/", addr)
}
