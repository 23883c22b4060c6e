//! Tool handler trait.

use anyhow::Result;
use seqkit_mcp_types::{CallToolResult, Tool};
use serde_json::Value;

/// Implemented by anything the server can route a `tools/call` to.
///
/// A handler returning `Err` is a handler bug; expected failures (bad
/// arguments, subprocess errors) must be reported in-band through
/// `CallToolResult::error` so the client sees them as tool output.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// The tool definition advertised via `tools/list`.
    fn tool(&self) -> Tool;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: Value) -> Result<CallToolResult>;
}

/// Function-backed handler, mainly useful in tests.
pub struct FnToolHandler<F>
where
    F: Fn(Value) -> Result<CallToolResult> + Send + Sync,
{
    tool: Tool,
    handler: F,
}

impl<F> FnToolHandler<F>
where
    F: Fn(Value) -> Result<CallToolResult> + Send + Sync,
{
    pub fn new(tool: Tool, handler: F) -> Self {
        Self { tool, handler }
    }
}

#[async_trait::async_trait]
impl<F> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> Result<CallToolResult> + Send + Sync,
{
    fn tool(&self) -> Tool {
        self.tool.clone()
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        (self.handler)(arguments)
    }
}
