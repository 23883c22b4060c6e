//! Server construction.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::RwLock;

use seqkit_mcp_types::{Implementation, LogLevel, ServerCapabilities};

use crate::handlers::ToolHandler;
use crate::server::{McpServer, ServerState};

/// Builder for [`McpServer`].
///
/// Handlers are collected here and frozen into the server at `build` time;
/// a tool registered twice keeps the later handler.
pub struct McpServerBuilder {
    name: String,
    version: String,
    instructions: Option<String>,
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl McpServerBuilder {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            instructions: None,
            tools: Vec::new(),
        }
    }

    /// Instructions surfaced to the client in the initialize result.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Register a tool handler.
    pub fn tool_handler(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.tools.push(handler);
        self
    }

    /// Register several handlers at once.
    pub fn tool_handlers(mut self, handlers: impl IntoIterator<Item = Arc<dyn ToolHandler>>) -> Self {
        self.tools.extend(handlers);
        self
    }

    /// Freeze the configuration into a runnable server.
    pub fn build(self) -> Arc<McpServer> {
        let mut tools: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for handler in self.tools {
            tools.insert(handler.tool().name, handler);
        }

        let capabilities = ServerCapabilities::default().with_tools().with_logging();

        Arc::new(McpServer {
            info: Implementation::new(self.name, self.version),
            capabilities,
            instructions: self.instructions,
            tools,
            log_level: RwLock::new(LogLevel::Info),
            state: RwLock::new(ServerState::Uninitialized),
            running: AtomicBool::new(false),
            client_info: RwLock::new(None),
        })
    }
}
