//! Server core: request dispatch and the stdio transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use seqkit_mcp_types::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult, LogLevel,
    RequestId, ServerCapabilities, SetLogLevelParams, methods,
};

use crate::handlers::ToolHandler;

/// Lifecycle of a server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No `initialize` request seen yet.
    Uninitialized,
    /// `initialize` answered, waiting for the `initialized` notification.
    Initializing,
    /// Serving requests.
    Ready,
    /// `stop` was called.
    ShuttingDown,
    /// Transport loop has exited.
    Stopped,
}

/// MCP server: a fixed set of tool handlers behind a JSON-RPC dispatch loop.
///
/// Handlers are registered at construction time and never change afterwards;
/// the locks below exist only for the mutable protocol state (lifecycle,
/// negotiated log level, client identity).
pub struct McpServer {
    pub(crate) info: Implementation,
    pub(crate) capabilities: ServerCapabilities,
    pub(crate) instructions: Option<String>,
    pub(crate) tools: HashMap<String, Arc<dyn ToolHandler>>,
    pub(crate) log_level: RwLock<LogLevel>,
    pub(crate) state: RwLock<ServerState>,
    pub(crate) running: AtomicBool,
    pub(crate) client_info: RwLock<Option<Implementation>>,
}

impl McpServer {
    pub fn info(&self) -> &Implementation {
        &self.info
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Advertised tool definitions, sorted by name for stable listings.
    pub fn tools(&self) -> Vec<seqkit_mcp_types::Tool> {
        let mut tools: Vec<_> = self.tools.values().map(|h| h.tool()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub async fn log_level(&self) -> LogLevel {
        *self.log_level.read().await
    }

    /// Identity the client reported during initialization.
    pub async fn client_info(&self) -> Option<Implementation> {
        self.client_info.read().await.clone()
    }

    // ========================================================================
    // Request dispatch
    // ========================================================================

    /// Handle one JSON-RPC request and produce its response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, id = %request.id, "Handling request");

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request.params).await,
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => self.handle_list_tools(),
            methods::TOOLS_CALL => self.handle_call_tool(request.params).await,
            methods::LOGGING_SET_LEVEL => self.handle_set_log_level(request.params).await,
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(error) => JsonRpcResponse::error(request.id, error),
        }
    }

    /// Handle a notification. Notifications never produce output.
    pub async fn handle_notification(&self, notification: JsonRpcNotification) {
        debug!(method = %notification.method, "Handling notification");

        match notification.method.as_str() {
            methods::INITIALIZED => {
                *self.state.write().await = ServerState::Ready;
                info!("Server initialized and ready");
            }
            methods::CANCELLED => {
                // The stdio loop is sequential, so a cancellation can only
                // arrive after the request it names has already completed.
                debug!("Cancellation notification ignored (requests are serviced in order)");
            }
            _ => {
                warn!(method = %notification.method, "Unknown notification");
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        // Check and transition under one write lock so concurrent initialize
        // requests cannot both pass the uninitialized check.
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Uninitialized {
                return Err(JsonRpcError::invalid_request("Server already initialized"));
            }
            *state = ServerState::Initializing;
        }

        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?
            .unwrap_or_default();

        info!(
            client = %init_params.client_info.name,
            version = %init_params.client_info.version,
            protocol = %init_params.protocol_version,
            "Client connected"
        );
        *self.client_info.write().await = Some(init_params.client_info);

        let mut result = InitializeResult::new(self.info.clone(), self.capabilities.clone());
        if let Some(instructions) = &self.instructions {
            result = result.with_instructions(instructions.clone());
        }

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        let result = ListToolsResult::new(self.tools());
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let call_params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))
            })?;

        let handler = self.tools.get(&call_params.name).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("Unknown tool: {}", call_params.name))
        })?;

        debug!(tool = %call_params.name, "Calling tool");
        let arguments = call_params.arguments.unwrap_or(json!({}));

        let result = match handler.execute(arguments).await {
            Ok(call_result) => call_result,
            Err(e) => {
                error!(tool = %call_params.name, error = %e, "Tool handler failed");
                CallToolResult::error(e.to_string())
            }
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn handle_set_log_level(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let level_params: SetLogLevelParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))
            })?;

        *self.log_level.write().await = level_params.level;
        debug!(level = %level_params.level, "Log level changed");

        Ok(json!({}))
    }

    // ========================================================================
    // Stdio transport
    // ========================================================================

    /// Serve newline-delimited JSON-RPC over stdin/stdout until EOF.
    ///
    /// Diagnostics must never be written to stdout: the transport owns it.
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        info!(server = %self.info.name, "Starting MCP server on stdio");
        self.running.store(true, Ordering::SeqCst);

        let mut reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        while self.running.load(Ordering::SeqCst) {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("EOF on stdin, shutting down");
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(trimmed) {
                        let response = self.handle_request(request).await;
                        write_message(&mut stdout, &response).await?;
                    } else if let Ok(notification) =
                        serde_json::from_str::<JsonRpcNotification>(trimmed)
                    {
                        self.handle_notification(notification).await;
                    } else {
                        warn!(line = %trimmed, "Invalid JSON-RPC message");
                        let response = JsonRpcResponse::error(
                            RequestId::Number(0),
                            JsonRpcError::parse_error("Invalid JSON"),
                        );
                        write_message(&mut stdout, &response).await?;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Error reading from stdin");
                    break;
                }
            }
        }

        *self.state.write().await = ServerState::Stopped;
        self.running.store(false, Ordering::SeqCst);
        info!("MCP server stopped");

        Ok(())
    }

    /// Request the transport loop to exit after the current message.
    pub async fn stop(&self) {
        info!("Stopping MCP server");
        *self.state.write().await = ServerState::ShuttingDown;
        self.running.store(false, Ordering::SeqCst);
    }
}

async fn write_message(stdout: &mut tokio::io::Stdout, response: &JsonRpcResponse) -> Result<()> {
    let payload = serde_json::to_string(response).context("Failed to serialize response")?;
    stdout
        .write_all(payload.as_bytes())
        .await
        .context("Failed to write response")?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
