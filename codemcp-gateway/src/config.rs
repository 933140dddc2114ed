//! Gateway configuration and endpoint URL resolution
//!
//! The endpoint URL is looked up in precedence order: the `--endpoint-url`
//! flag, the `GCF_URL` environment variable, then the optional TOML config
//! file. When none of those yield a URL, the gateway deploys the endpoint
//! itself the first time a tool call needs it.

use anyhow::{anyhow, Context, Result};
use codemcp_deploy::{Deployer, DEFAULT_SOURCE_DIR};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use url::Url;

use crate::client::REQUEST_TIMEOUT;

/// Environment variable consulted for the endpoint URL.
pub const GCF_URL_ENV: &str = "GCF_URL";
/// Config file looked for in the working directory when no `--config`
/// flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "codemcp.toml";

/// On-disk configuration. Everything is optional; flags and the
/// environment override the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub endpoint_url: Option<String>,
    #[serde(default, with = "humantime_serde::option")]
    pub request_timeout: Option<Duration>,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployConfig {
    pub project: Option<String>,
    pub source_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Loads `path` if it exists. A missing default config is not an
    /// error; a missing explicitly-requested one is.
    fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Merged gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint_url: Option<String>,
    pub request_timeout: Duration,
    pub deploy_project: Option<String>,
    pub deploy_source_dir: PathBuf,
}

impl GatewayConfig {
    pub fn resolve(cli_url: Option<String>, config_path: Option<&Path>) -> Result<Self> {
        let env_url = std::env::var(GCF_URL_ENV).ok();
        Self::resolve_with_env(cli_url, env_url, config_path)
    }

    fn resolve_with_env(
        cli_url: Option<String>,
        env_url: Option<String>,
        config_path: Option<&Path>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::load_optional(Path::new(DEFAULT_CONFIG_PATH))?,
        };

        let endpoint_url = cli_url
            .or(env_url.filter(|url| !url.is_empty()))
            .or(file.endpoint_url);
        if let Some(url) = &endpoint_url {
            validate_endpoint_url(url)?;
        }

        Ok(Self {
            endpoint_url,
            request_timeout: file.request_timeout.unwrap_or(REQUEST_TIMEOUT),
            deploy_project: file.deploy.project,
            deploy_source_dir: file
                .deploy
                .source_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR)),
        })
    }
}

/// The endpoint URL must be an absolute http(s) URL.
fn validate_endpoint_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid endpoint URL: {}", url))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("Endpoint URL must be http(s), got {}://", other)),
    }
}

/// Lazily resolved endpoint URL.
///
/// When no URL was configured, the first caller triggers a deployment;
/// concurrent first callers serialize on the cell. A failed attempt
/// leaves the cell empty, so a later call gets to retry.
pub struct EndpointResolver {
    configured: Option<String>,
    deploy_project: Option<String>,
    deploy_source_dir: PathBuf,
    deployed: OnceCell<String>,
}

impl EndpointResolver {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            configured: config.endpoint_url.clone(),
            deploy_project: config.deploy_project.clone(),
            deploy_source_dir: config.deploy_source_dir.clone(),
            deployed: OnceCell::new(),
        }
    }

    /// Whether a URL is already known without deploying anything.
    pub fn is_configured(&self) -> bool {
        self.configured.is_some() || self.deployed.initialized()
    }

    pub async fn resolve(&self) -> Result<&str> {
        if let Some(url) = &self.configured {
            return Ok(url);
        }
        let url = self
            .deployed
            .get_or_try_init(|| self.deploy_endpoint())
            .await?;
        Ok(url)
    }

    async fn deploy_endpoint(&self) -> Result<String> {
        warn!("No endpoint URL configured, deploying the execution endpoint");
        let deployer = Deployer::new(self.deploy_project.clone(), self.deploy_source_dir.clone());
        let report = deployer.deploy().await?;
        info!("Execution endpoint deployed at {}", report.function_url);
        validate_endpoint_url(&report.function_url)?;
        Ok(report.function_url)
    }
}
