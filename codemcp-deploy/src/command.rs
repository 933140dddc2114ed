//! Seam between the deployer and the operating system

use async_trait::async_trait;
use std::io;
use tokio::process::Command;

/// Captured result of one CLI invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands on behalf of the deployer. Tests substitute a
/// scripted implementation to assert the exact invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program args..` and captures its output.
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;

    /// Runs `program args..` with inherited stdio, so long steps stream
    /// their progress to the operator. Returns whether the command
    /// exited successfully.
    async fn run_streaming(&self, program: &str, args: &[String]) -> io::Result<bool>;
}

/// The real thing: tokio child processes.
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_streaming(&self, program: &str, args: &[String]) -> io::Result<bool> {
        let status = Command::new(program).args(args).status().await?;
        Ok(status.success())
    }
}
