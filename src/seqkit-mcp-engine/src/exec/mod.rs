//! Command execution.
//!
//! One seqkit invocation = one child process, spawned from an argument
//! vector (never a shell), with bounded output capture and a wall-clock
//! timeout. The [`CommandRunner`] trait is the seam the tool handlers talk
//! through, so tests can substitute a recording fake and prove that invalid
//! requests never reach a real process.

mod runner;

pub use runner::{ExecOptions, ExecOutput, run_command};

use crate::error::Result;

/// Executes one prepared argument vector to completion or timeout.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: &[String], options: &ExecOptions) -> Result<ExecOutput>;
}

/// The production runner; delegates to [`run_command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait::async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String], options: &ExecOptions) -> Result<ExecOutput> {
        run_command(argv, options).await
    }
}
