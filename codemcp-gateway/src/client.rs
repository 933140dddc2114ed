//! HTTP client for the execution endpoint

use anyhow::{anyhow, Context, Result};
use codemcp_common::{ExecuteRequest, ExecuteResponse};
use std::time::Duration;
use tracing::debug;

/// How long to wait for the endpoint to answer. Sits above the endpoint's
/// own 30 second execution budget so genuine timeouts are reported by the
/// endpoint rather than cut off mid-flight by the client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(35);

pub struct EndpointClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl EndpointClient {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// POSTs `{code, language}` to `url` and decodes the endpoint's JSON.
    /// Transport failures and non-2xx statuses are both hard errors; the
    /// caller reports them without retrying.
    pub async fn execute(&self, url: &str, request: &ExecuteRequest) -> Result<ExecuteResponse> {
        debug!("Forwarding {} execution to {}", request.language, url);

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .context("Execution endpoint unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Execution endpoint returned {}: {}",
                status,
                body.trim()
            ));
        }

        response
            .json::<ExecuteResponse>()
            .await
            .context("Invalid response from execution endpoint")
    }
}

impl Default for EndpointClient {
    fn default() -> Self {
        Self::new()
    }
}
