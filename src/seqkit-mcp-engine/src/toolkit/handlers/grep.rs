//! Sequence search (`seqkit grep`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqkit_mcp_server::ToolHandler;
use seqkit_mcp_types::{CallToolResult, PropertySchema, Tool, ToolInputSchema};

use crate::error::Result;
use crate::toolkit::ToolRuntime;
use crate::toolkit::output::resolve_output_path;
use crate::toolkit::rules::{self, ArgRule};
use crate::toolkit::validate::{check_auxiliary_file, check_input_file, exactly_one_of};

use super::{into_call_result, output_stats, parse_args, run_seqkit, to_map};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GrepArgs {
    input_file: PathBuf,
    pattern: Option<String>,
    pattern_file: Option<PathBuf>,
    #[serde(default)]
    search_sequence: bool,
    #[serde(default)]
    invert_match: bool,
    #[serde(default)]
    ignore_case: bool,
    output_file: Option<PathBuf>,
}

const RULES: &[ArgRule] = &[
    ArgRule::Switch {
        param: "search_sequence",
        flags: &["-s"],
    },
    ArgRule::Switch {
        param: "invert_match",
        flags: &["-v"],
    },
    ArgRule::Switch {
        param: "ignore_case",
        flags: &["-i"],
    },
    ArgRule::Value {
        param: "pattern",
        flag: "-p",
    },
    ArgRule::Value {
        param: "pattern_file",
        flag: "-f",
    },
];

pub struct GrepHandler {
    runtime: ToolRuntime,
}

impl GrepHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let args: GrepArgs = parse_args(arguments)?;

        exactly_one_of(&[
            ("pattern", args.pattern.is_some()),
            ("pattern_file", args.pattern_file.is_some()),
        ])?;
        if let Some(patterns) = &args.pattern_file {
            check_auxiliary_file(patterns, "Pattern file")?;
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "filtered",
            None,
        )?;

        let mut argv = self.runtime.seqkit_argv("grep");
        rules::apply(RULES, &to_map(&args)?, &mut argv)?;
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, "grep", argv).await?;
        let stats = output_stats(&self.runtime, &output).await;

        Ok(format!(
            "Sequence filtering completed!\n\n\
             Output file: {}\n\
             Pattern: {}\n\
             Search in sequence: {}\n\n\
             Filtered sequences statistics:\n{}",
            output.display(),
            args.pattern.as_deref().unwrap_or("from file"),
            args.search_sequence,
            stats
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for GrepHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_grep", "Search sequences by pattern or ID").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "pattern",
                    PropertySchema::string().description("Search pattern (regex supported)"),
                )
                .property(
                    "pattern_file",
                    PropertySchema::string().description("File with list of patterns/IDs"),
                )
                .property(
                    "search_sequence",
                    PropertySchema::boolean()
                        .description("Search in sequence instead of header")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "invert_match",
                    PropertySchema::boolean()
                        .description("Invert match (exclude matching sequences)")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "ignore_case",
                    PropertySchema::boolean()
                        .description("Ignore case")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "output_file",
                    PropertySchema::string()
                        .description("Output path (derived under the temp root when omitted)"),
                )
                .required(vec!["input_file"]),
        )
    }

    async fn execute(&self, arguments: Value) -> anyhow::Result<CallToolResult> {
        into_call_result(self.run(arguments).await)
    }
}
