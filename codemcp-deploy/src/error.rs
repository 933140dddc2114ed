use thiserror::Error;

/// Deployment halts at the first failing step. Each variant carries the
/// operator-facing message for that step; lower-level causes (a vanished
/// binary, an unreadable pipe) fold into the step they interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("gcloud CLI not installed")]
    GcloudMissing,

    #[error("No GCP project configured")]
    NoProject,

    #[error("Function deployment failed")]
    DeployFailed,

    #[error("Could not retrieve function URL")]
    UrlUnavailable,
}
