//! One handler per seqkit operation.
//!
//! Handlers share the same shape: deserialize arguments, validate them,
//! check the input file, assemble the argument vector, run it, format a
//! summary. The helpers here cover the shared steps; anything
//! operation-specific stays in the operation's own module.

mod convert;
mod grep;
mod rmdup;
mod sample;
mod seq;
mod sort;
mod stats;
mod subseq;

pub use convert::ConvertHandler;
pub use grep::GrepHandler;
pub use rmdup::RmdupHandler;
pub use sample::SampleHandler;
pub use seq::SeqHandler;
pub use sort::SortHandler;
pub use stats::StatsHandler;
pub use subseq::SubseqHandler;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use seqkit_mcp_types::CallToolResult;

use crate::error::{EngineError, Result};
use crate::exec::ExecOutput;

use super::ToolRuntime;

/// Deserialize tool arguments; anything serde rejects is a validation
/// error, including unknown parameter names.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| EngineError::Validation(format!("invalid arguments: {e}")))
}

/// Re-project validated arguments as a JSON map for the flag table.
pub(crate) fn to_map<T: Serialize>(args: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(args)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Map an operation outcome onto the protocol result. Engine errors are
/// expected failures and travel in-band; they never bubble up as handler
/// errors.
pub(crate) fn into_call_result(result: Result<String>) -> anyhow::Result<CallToolResult> {
    match result {
        Ok(summary) => Ok(CallToolResult::text(summary)),
        Err(e) => {
            debug!(error = %e, "tool call failed");
            Ok(CallToolResult::error(e.to_string()))
        }
    }
}

/// Run a prepared seqkit invocation and enforce the executor contract:
/// a timeout or non-zero exit becomes the matching engine error.
pub(crate) async fn run_seqkit(
    runtime: &ToolRuntime,
    tool: &str,
    argv: Vec<String>,
) -> Result<ExecOutput> {
    let output = runtime.runner.run(&argv, &runtime.exec_options()).await?;

    if output.timed_out {
        return Err(EngineError::Timeout {
            tool: tool.to_string(),
            elapsed_secs: output.duration.as_secs(),
            limit_secs: runtime.settings.timeout.as_secs(),
        });
    }
    if output.exit_code != 0 {
        return Err(EngineError::CommandFailed {
            tool: tool.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    Ok(output)
}

/// Tabular statistics for a freshly written output file, used to enrich
/// the summaries of extraction and transformation results. Best effort: a
/// failure here must not fail the call that produced the file.
pub(crate) async fn output_stats(runtime: &ToolRuntime, path: &Path) -> String {
    let mut argv = runtime.seqkit_argv("stats");
    argv.push("-T".to_string());
    argv.push(path.display().to_string());

    match runtime.runner.run(&argv, &runtime.exec_options()).await {
        Ok(output) if output.exit_code == 0 && !output.timed_out => output.stdout,
        _ => "(statistics unavailable)\n".to_string(),
    }
}
