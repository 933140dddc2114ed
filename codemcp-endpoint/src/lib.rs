//! Execution endpoint - stateless code execution over HTTP
//!
//! Accepts `{code, language}`, runs the snippet through the interpreter
//! dispatch table with a wall-clock budget, and reports stdout, stderr and
//! the exit code. Executions run with the privileges of this process; there
//! is no sandboxing beyond the timeout, which is why the endpoint is meant
//! to be deployed into an isolated, throwaway environment.

mod runner;
mod server;

pub use runner::{CodeRunner, ExecutionOutcome, Executor, EXECUTION_TIMEOUT};
pub use server::{router, router_with_runner, serve, serve_on, TIMEOUT_MESSAGE};

/// Re-export common error types
pub type Result<T> = anyhow::Result<T>;
