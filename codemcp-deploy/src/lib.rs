//! Provisioning of the execution endpoint onto Google Cloud Functions
//!
//! Thin orchestration over the `gcloud` CLI: probe for the binary, resolve
//! the target project, deploy the function, then describe it to discover
//! the HTTPS trigger URL. Commands go through [`CommandRunner`] so the
//! sequence can be tested without a gcloud install.

mod command;
mod deployer;
mod error;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use deployer::{DeployReport, Deployer, DEFAULT_SOURCE_DIR, FUNCTION_NAME, REGION};
pub use error::DeployError;
