//! MCP gateway - advertises the `run_code` tool over stdio
//!
//! A long-lived process speaking JSON-RPC 2.0 line by line on
//! stdin/stdout. Tool calls are forwarded to the execution endpoint over
//! HTTP; when no endpoint URL is configured, the gateway deploys one on
//! first use.

mod client;
mod config;
mod render;
mod server;

pub use client::{EndpointClient, REQUEST_TIMEOUT};
pub use config::{
    DeployConfig, EndpointResolver, FileConfig, GatewayConfig, DEFAULT_CONFIG_PATH, GCF_URL_ENV,
};
pub use render::render_output;
pub use server::{McpServer, SERVER_NAME, TOOL_NAME};
