//! Generic MCP server core for seqkit-mcp.
//!
//! This crate knows nothing about seqkit. It provides:
//! - the [`ToolHandler`] trait tool implementations plug into,
//! - [`McpServer`] with its lifecycle state machine and JSON-RPC dispatch,
//! - a newline-delimited stdio transport,
//! - [`McpServerBuilder`] for wiring handlers together.
//!
//! # Example
//! ```rust,no_run
//! use seqkit_mcp_server::McpServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = McpServerBuilder::new("my-server", "1.0.0").build();
//!     server.run_stdio().await
//! }
//! ```

mod builder;
mod handlers;
mod server;

pub use builder::McpServerBuilder;
pub use handlers::{FnToolHandler, ToolHandler};
pub use server::{McpServer, ServerState};

// Re-export the protocol types for convenience.
pub use seqkit_mcp_types;
