//! Shared vocabulary for the code-interpreter workspace: the language
//! dispatch table, the execution endpoint wire types, and the JSON-RPC /
//! MCP message frames exchanged over stdio.

pub mod api;
pub mod language;
pub mod messages;

pub use api::*;
pub use language::*;
pub use messages::*;
