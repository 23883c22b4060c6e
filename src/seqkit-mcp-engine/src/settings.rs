//! Process-wide configuration.
//!
//! Built once at startup and passed to the tool handlers by reference;
//! nothing here changes while the server is running. Every field can be
//! overridden with a `SEQKIT_MCP_*` environment variable, and the CLI may
//! override on top of that.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EngineError, Result};

/// `seqkit_path` override.
pub const ENV_SEQKIT_PATH: &str = "SEQKIT_MCP_PATH";
/// `max_file_size` override, in bytes.
pub const ENV_MAX_FILE_SIZE: &str = "SEQKIT_MCP_MAX_FILE_SIZE";
/// `timeout` override, in seconds.
pub const ENV_TIMEOUT: &str = "SEQKIT_MCP_TIMEOUT";
/// `max_output_size` override, in bytes.
pub const ENV_MAX_OUTPUT_SIZE: &str = "SEQKIT_MCP_MAX_OUTPUT_SIZE";
/// `temp_dir` override.
pub const ENV_TEMP_DIR: &str = "SEQKIT_MCP_TEMP_DIR";

/// Default input size cap: 10 GiB, sized for large sequence files.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024 * 1024;
/// Default command timeout: 10 minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
/// Default captured-output cap per stream: 1 MiB.
pub const DEFAULT_MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Immutable server configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path or name of the seqkit executable. A bare name is resolved on
    /// `PATH` at spawn time.
    pub seqkit_path: PathBuf,
    /// Largest accepted input file, in bytes.
    pub max_file_size: u64,
    /// Wall-clock limit for one seqkit invocation.
    pub timeout: Duration,
    /// Per-stream capture limit; longer output is truncated and flagged.
    pub max_output_size: usize,
    /// Root directory for derived output files.
    pub temp_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seqkit_path: PathBuf::from("seqkit"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl Settings {
    /// Build settings from the process environment. A malformed value is a
    /// startup error, never a silent fallback to the default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(path) = lookup(ENV_SEQKIT_PATH) {
            settings.seqkit_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_MAX_FILE_SIZE) {
            settings.max_file_size = parse_env(ENV_MAX_FILE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            settings.timeout = Duration::from_secs(parse_env(ENV_TIMEOUT, &raw)?);
        }
        if let Some(raw) = lookup(ENV_MAX_OUTPUT_SIZE) {
            settings.max_output_size = parse_env(ENV_MAX_OUTPUT_SIZE, &raw)?;
        }
        if let Some(dir) = lookup(ENV_TEMP_DIR) {
            settings.temp_dir = PathBuf::from(dir);
        }

        Ok(settings)
    }

    /// Resolve the configured seqkit executable to an absolute path. A bare
    /// name is looked up on `PATH`; an explicit path must exist.
    pub fn resolve_seqkit(&self) -> Result<PathBuf> {
        if self.seqkit_path.components().count() > 1 {
            if self.seqkit_path.is_file() {
                return Ok(self.seqkit_path.clone());
            }
            return Err(EngineError::Config(format!(
                "seqkit executable not found at {}",
                self.seqkit_path.display()
            )));
        }

        which::which(&self.seqkit_path).map_err(|_| {
            EngineError::Config(format!(
                "seqkit executable '{}' not found on PATH",
                self.seqkit_path.display()
            ))
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        EngineError::Config(format!("invalid value for {key}: {raw:?}"))
    })
}
