//! Wire types for the execution endpoint HTTP contract

use serde::{Deserialize, Serialize};

/// Request body for `POST /` on the execution endpoint.
///
/// `language` travels as a plain string so the endpoint can report unknown
/// values verbatim in its error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,
    pub language: String,
}

impl ExecuteRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Endpoint response for an execution that was dispatched, whether or not
/// the code itself succeeded. A timeout or an interpreter failure still
/// produces one of these, with `exit_code` -1 and the reason in `stderr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "exitCode")]
    pub exit_code: i32,
}

/// Error payload returned with 4xx/5xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
