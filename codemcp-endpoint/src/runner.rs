//! Interpreter process runner

use async_trait::async_trait;
use codemcp_common::Language;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

/// Wall-clock budget for a single execution.
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// What became of one interpreter run.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The child ran to completion. The exit code may still be non-zero.
    Completed {
        stdout: String,
        stderr: String,
        exit_code: i32,
    },
    /// The child outlived the budget and was killed. Partial output is
    /// discarded.
    TimedOut,
    /// The interpreter process could not be started or waited on.
    SpawnFailed { message: String },
}

/// Executes snippets on behalf of the HTTP handler. Tests substitute
/// implementations that fail on demand to drive the error arms.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn run(&self, language: Language, code: &str) -> ExecutionOutcome;
}

/// Runs code snippets through the per-language interpreter table.
#[derive(Debug, Clone)]
pub struct CodeRunner {
    timeout: Duration,
}

impl CodeRunner {
    pub fn new() -> Self {
        Self {
            timeout: EXECUTION_TIMEOUT,
        }
    }

    /// Runner with a non-default budget, so the timeout path can be
    /// exercised without waiting out the full 30 seconds.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Spawns `program args.. code` and waits within the budget.
    pub(crate) async fn run_argv(
        &self,
        program: &str,
        args: &[&str],
        code: &str,
    ) -> ExecutionOutcome {
        let mut child = match Command::new(program)
            .args(args)
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to spawn {}: {}", program, e);
                return ExecutionOutcome::SpawnFailed {
                    message: e.to_string(),
                };
            }
        };

        // Drain both pipes while waiting so a chatty child cannot fill the
        // pipe buffer and deadlock against wait().
        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                error!("Process wait error: {}", e);
                stdout_task.abort();
                stderr_task.abort();
                return ExecutionOutcome::SpawnFailed {
                    message: e.to_string(),
                };
            }
            Err(_) => {
                // Timeout - kill the process
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return ExecutionOutcome::TimedOut;
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        ExecutionOutcome::Completed {
            stdout,
            stderr,
            // A None exit code means the child died to a signal; fold that
            // into the failure sentinel.
            exit_code: status.code().unwrap_or(-1),
        }
    }
}

#[async_trait]
impl Executor for CodeRunner {
    async fn run(&self, language: Language, code: &str) -> ExecutionOutcome {
        let execution_id = Uuid::new_v4();
        info!(%execution_id, "Executing {} code", language);
        let argv = language.command();
        self.run_argv(argv[0], &argv[1..], code).await
    }
}

impl Default for CodeRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
