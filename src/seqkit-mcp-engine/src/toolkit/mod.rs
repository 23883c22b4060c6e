//! The seqkit tool catalog.
//!
//! Each seqkit operation is one [`ToolHandler`]: it deserializes and
//! validates its arguments, checks the input file, builds an argument
//! vector from a declarative parameter→flag table, hands it to the
//! [`CommandRunner`], and formats the result. Validation failures never
//! reach the runner.

mod output;
mod rules;
mod validate;

pub mod handlers;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use seqkit_mcp_server::ToolHandler;

use crate::exec::{CommandRunner, ExecOptions};
use crate::settings::Settings;

use handlers::{
    ConvertHandler, GrepHandler, RmdupHandler, SampleHandler, SeqHandler, SortHandler,
    StatsHandler, SubseqHandler,
};

/// Shared state every handler needs: the immutable settings and the runner.
#[derive(Clone)]
pub(crate) struct ToolRuntime {
    pub settings: Arc<Settings>,
    pub runner: Arc<dyn CommandRunner>,
}

impl ToolRuntime {
    pub(crate) fn new(settings: Arc<Settings>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { settings, runner }
    }

    /// Execution options derived from the settings.
    pub(crate) fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            timeout: self.settings.timeout,
            max_output_size: self.settings.max_output_size,
            ..ExecOptions::default()
        }
    }

    /// Start of every argument vector: the seqkit executable plus a
    /// subcommand.
    pub(crate) fn seqkit_argv(&self, subcommand: &str) -> Vec<String> {
        vec![
            self.settings.seqkit_path.display().to_string(),
            subcommand.to_string(),
        ]
    }
}

/// Build the full set of seqkit tool handlers.
pub fn seqkit_handlers(
    settings: Arc<Settings>,
    runner: Arc<dyn CommandRunner>,
) -> Vec<Arc<dyn ToolHandler>> {
    let runtime = ToolRuntime::new(settings, runner);
    vec![
        Arc::new(StatsHandler::new(runtime.clone())),
        Arc::new(SubseqHandler::new(runtime.clone())),
        Arc::new(GrepHandler::new(runtime.clone())),
        Arc::new(SeqHandler::new(runtime.clone())),
        Arc::new(SortHandler::new(runtime.clone())),
        Arc::new(RmdupHandler::new(runtime.clone())),
        Arc::new(SampleHandler::new(runtime.clone())),
        Arc::new(ConvertHandler::new(runtime)),
    ]
}
