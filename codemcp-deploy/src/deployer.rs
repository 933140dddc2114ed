//! The four-step gcloud deployment sequence

use std::path::PathBuf;
use tracing::{debug, info};

use crate::command::{CommandRunner, SystemCommandRunner};
use crate::error::DeployError;

/// Name the function is deployed under and described as.
pub const FUNCTION_NAME: &str = "code-interpreter";
/// Region the function lives in.
pub const REGION: &str = "us-central1";
/// Where the function handler source is expected, relative to the
/// working directory.
pub const DEFAULT_SOURCE_DIR: &str = "./gcf";

const RUNTIME: &str = "python311";
const ENTRY_POINT: &str = "execute_code";
const FUNCTION_TIMEOUT: &str = "60s";
const FUNCTION_MEMORY: &str = "256MB";

/// Result of a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub function_url: String,
    pub project_id: String,
}

/// Deploys the execution endpoint by shelling out to the gcloud CLI.
///
/// Steps run sequentially and the first failure wins: probe for gcloud,
/// resolve the target project, deploy, then describe the function to get
/// its HTTPS trigger URL. Every step is idempotent at the CLI level, so a
/// failed deployment can simply be retried.
pub struct Deployer<R: CommandRunner> {
    runner: R,
    project_id: Option<String>,
    source_dir: PathBuf,
}

impl Deployer<SystemCommandRunner> {
    pub fn new(project_id: Option<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(SystemCommandRunner, project_id, source_dir)
    }
}

impl<R: CommandRunner> Deployer<R> {
    pub fn with_runner(runner: R, project_id: Option<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            project_id,
            source_dir: source_dir.into(),
        }
    }

    pub async fn deploy(&self) -> Result<DeployReport, DeployError> {
        self.check_gcloud().await?;

        let project_id = match &self.project_id {
            Some(id) => id.clone(),
            None => self.current_project().await?,
        };
        info!("Using GCP project: {}", project_id);

        self.deploy_function(&project_id).await?;

        let function_url = self.function_url(&project_id).await?;
        Ok(DeployReport {
            function_url,
            project_id,
        })
    }

    /// A spawn failure is the one signal that gcloud is absent; the
    /// probe's exit code is irrelevant.
    async fn check_gcloud(&self) -> Result<(), DeployError> {
        debug!("Checking for gcloud CLI");
        self.runner
            .run("gcloud", &args(&["--version"]))
            .await
            .map_err(|_| DeployError::GcloudMissing)?;
        Ok(())
    }

    async fn current_project(&self) -> Result<String, DeployError> {
        debug!("Resolving default GCP project");
        let output = self
            .runner
            .run("gcloud", &args(&["config", "get-value", "project"]))
            .await
            .map_err(|_| DeployError::NoProject)?;

        let project = output.stdout.trim();
        if !output.success || project.is_empty() {
            return Err(DeployError::NoProject);
        }
        Ok(project.to_string())
    }

    async fn deploy_function(&self, project_id: &str) -> Result<(), DeployError> {
        let mut deploy_args = args(&[
            "functions",
            "deploy",
            FUNCTION_NAME,
            &format!("--runtime={}", RUNTIME),
            "--trigger-http",
            "--allow-unauthenticated",
            &format!("--entry-point={}", ENTRY_POINT),
            &format!("--source={}", self.source_dir.display()),
            &format!("--region={}", REGION),
            &format!("--timeout={}", FUNCTION_TIMEOUT),
            &format!("--memory={}", FUNCTION_MEMORY),
        ]);
        deploy_args.push(format!("--project={}", project_id));

        info!("Deploying function (this may take 1-2 minutes)");
        let deployed = self
            .runner
            .run_streaming("gcloud", &deploy_args)
            .await
            .map_err(|_| DeployError::DeployFailed)?;
        if !deployed {
            return Err(DeployError::DeployFailed);
        }
        info!("Function deployed successfully");
        Ok(())
    }

    async fn function_url(&self, project_id: &str) -> Result<String, DeployError> {
        let mut describe_args = args(&[
            "functions",
            "describe",
            FUNCTION_NAME,
            "--region",
            REGION,
            "--format",
            "value(httpsTrigger.url)",
        ]);
        describe_args.push(format!("--project={}", project_id));

        let output = self
            .runner
            .run("gcloud", &describe_args)
            .await
            .map_err(|_| DeployError::UrlUnavailable)?;

        let url = output.stdout.trim();
        if !output.success || url.is_empty() {
            return Err(DeployError::UrlUnavailable);
        }
        Ok(url.to_string())
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
