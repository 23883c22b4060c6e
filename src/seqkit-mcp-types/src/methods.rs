//! MCP method name constants.

// Lifecycle
/// Initialize request.
pub const INITIALIZE: &str = "initialize";
/// Ping request.
pub const PING: &str = "ping";

// Notifications
/// Sent by the client once initialization has completed.
pub const INITIALIZED: &str = "notifications/initialized";
/// Request cancellation notification.
pub const CANCELLED: &str = "notifications/cancelled";

// Tools
/// List available tools.
pub const TOOLS_LIST: &str = "tools/list";
/// Invoke a tool.
pub const TOOLS_CALL: &str = "tools/call";

// Logging
/// Change the server log level.
pub const LOGGING_SET_LEVEL: &str = "logging/setLevel";
