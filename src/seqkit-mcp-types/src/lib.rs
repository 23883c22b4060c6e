//! Model Context Protocol type definitions for the seqkit-mcp server.
//!
//! Only the slice of MCP that a tools-only server needs is modelled here:
//! the JSON-RPC 2.0 envelope, initialization and capability negotiation,
//! tool definitions with their input schemas, and the logging level
//! handshake. Resources, prompts, sampling and roots are intentionally
//! absent; this server never advertises them.

mod content;
mod initialize;
mod jsonrpc;
mod logging;
mod tools;

/// MCP method name constants.
pub mod methods;

/// Protocol version this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub use content::Content;
pub use initialize::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, LoggingCapability,
    ServerCapabilities, ToolsCapability,
};
pub use jsonrpc::{
    ErrorCode, JSONRPC_VERSION, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RequestId,
};
pub use logging::{LogLevel, SetLogLevelParams};
pub use tools::{
    CallToolParams, CallToolResult, ListToolsResult, PropertySchema, Tool, ToolInputSchema,
};
