//! Sequence statistics (`seqkit stats`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqkit_mcp_server::ToolHandler;
use seqkit_mcp_types::{CallToolResult, PropertySchema, Tool, ToolInputSchema};

use crate::error::Result;
use crate::toolkit::ToolRuntime;
use crate::toolkit::rules::{self, ArgRule};
use crate::toolkit::validate::check_input_file;

use super::{into_call_result, parse_args, run_seqkit, to_map};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatsArgs {
    input_file: PathBuf,
    #[serde(default)]
    all_stats: bool,
}

const RULES: &[ArgRule] = &[ArgRule::Switch {
    param: "all_stats",
    flags: &["-a"],
}];

pub struct StatsHandler {
    runtime: ToolRuntime,
}

impl StatsHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let args: StatsArgs = parse_args(arguments)?;
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let mut argv = self.runtime.seqkit_argv("stats");
        rules::apply(RULES, &to_map(&args)?, &mut argv)?;
        // -T selects machine-friendly tabular output.
        argv.push("-T".to_string());
        argv.push(args.input_file.display().to_string());

        let output = run_seqkit(&self.runtime, "stats", argv).await?;
        Ok(format!("Sequence Statistics:\n\n{}", output.stdout))
    }
}

#[async_trait::async_trait]
impl ToolHandler for StatsHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_stats", "Get basic statistics of FASTA/FASTQ files").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "all_stats",
                    PropertySchema::boolean()
                        .description("Show all statistics including N50")
                        .default_value(Value::Bool(false)),
                )
                .required(vec!["input_file"]),
        )
    }

    async fn execute(&self, arguments: Value) -> anyhow::Result<CallToolResult> {
        into_call_result(self.run(arguments).await)
    }
}
