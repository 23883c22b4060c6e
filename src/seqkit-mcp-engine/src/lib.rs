//! seqkit-mcp engine.
//!
//! Everything between the MCP transport and the `seqkit` binary lives here:
//!
//! - [`Settings`]: process-wide configuration, immutable after startup,
//!   overridable through `SEQKIT_MCP_*` environment variables;
//! - [`error::EngineError`]: the failure taxonomy surfaced to clients;
//! - [`exec`]: the command executor: argv-only spawning, output capture
//!   with truncation, and timeout enforcement with graceful termination;
//! - [`toolkit`]: one [`seqkit_mcp_server::ToolHandler`] per seqkit
//!   operation, each validating its parameters before anything is spawned.
//!
//! No sequence parsing or statistics happen in this crate; seqkit does all
//! of that. The engine only builds argument vectors, runs the process, and
//! shapes the result.

pub mod error;
pub mod exec;
pub mod settings;
pub mod toolkit;

pub use error::{EngineError, Result};
pub use exec::{CommandRunner, ExecOptions, ExecOutput, ProcessRunner};
pub use settings::Settings;
pub use toolkit::seqkit_handlers;
