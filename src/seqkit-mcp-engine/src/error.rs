//! Error types for the seqkit-mcp engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure taxonomy. Everything except `Io`/`Json` maps onto a condition a
/// client can act on: fix the parameters, point at an existing file, raise
/// the timeout, or read seqkit's own diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Parameters were missing, mistyped, conflicting, or out of range.
    /// Raised before any subprocess is spawned.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed configuration (environment variable or CLI override).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input file not found: {path}")]
    InputFileNotFound { path: PathBuf },

    #[error("Input file too large: {path} is {size} bytes (limit {limit} bytes)")]
    InputFileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The seqkit invocation exited non-zero; carries its stderr.
    #[error("seqkit {tool} failed (exit code {exit_code}): {stderr}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// The process outlived the configured timeout and was terminated.
    #[error("seqkit {tool} timed out after {elapsed_secs}s (limit {limit_secs}s)")]
    Timeout {
        tool: String,
        elapsed_secs: u64,
        limit_secs: u64,
    },

    /// The executable could not be started at all.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
