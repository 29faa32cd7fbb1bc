//! MCP (Model Context Protocol) server over stdio using rmcp.
//!
//! Exposes the GitHub tools to MCP clients without the agent loop.

mod handlers;
mod server;

pub use handlers::run_mcp_server;
