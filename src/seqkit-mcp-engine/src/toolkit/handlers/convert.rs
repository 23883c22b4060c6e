//! Format conversion between FASTA and FASTQ (`seqkit fq2fa` / `fa2fq`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqkit_mcp_server::ToolHandler;
use seqkit_mcp_types::{CallToolResult, PropertySchema, Tool, ToolInputSchema};

use crate::error::{EngineError, Result};
use crate::toolkit::ToolRuntime;
use crate::toolkit::output::resolve_output_path;
use crate::toolkit::validate::check_input_file;

use super::{into_call_result, parse_args, run_seqkit};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConvertArgs {
    input_file: PathBuf,
    output_format: OutputFormat,
    #[serde(default)]
    line_width: u64,
    output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    Fasta,
    Fastq,
}

impl OutputFormat {
    /// The seqkit subcommand converting *into* this format.
    fn subcommand(self) -> &'static str {
        match self {
            Self::Fasta => "fq2fa",
            Self::Fastq => "fa2fq",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Fasta => "fa",
            Self::Fastq => "fq",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Fasta => "FASTA",
            Self::Fastq => "FASTQ",
        }
    }
}

pub struct ConvertHandler {
    runtime: ToolRuntime,
}

impl ConvertHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let args: ConvertArgs = parse_args(arguments)?;

        if args.line_width > 0 && args.output_format == OutputFormat::Fastq {
            return Err(EngineError::validation(
                "'line_width' only applies to FASTA output",
            ));
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "converted",
            Some(args.output_format.extension()),
        )?;

        let subcommand = args.output_format.subcommand();
        let mut argv = self.runtime.seqkit_argv(subcommand);
        if args.output_format == OutputFormat::Fasta && args.line_width > 0 {
            argv.push("-w".to_string());
            argv.push(args.line_width.to_string());
        }
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, subcommand, argv).await?;

        let output_size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);

        Ok(format!(
            "Format conversion completed!\n\n\
             Input: {}\n\
             Output: {}\n\
             Output format: {}\n\
             Output size: {output_size} bytes",
            args.input_file.display(),
            output.display(),
            args.output_format.label()
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for ConvertHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_convert", "Convert between FASTA and FASTQ formats").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to input file"),
                )
                .property(
                    "output_format",
                    PropertySchema::string()
                        .description("Output format")
                        .enum_values(vec!["fasta", "fastq"]),
                )
                .property(
                    "line_width",
                    PropertySchema::integer()
                        .description("Line width for FASTA output (0 for no wrapping)")
                        .default_value(Value::Number(0.into()))
                        .min(0.0),
                )
                .property(
                    "output_file",
                    PropertySchema::string()
                        .description("Output path (derived under the temp root when omitted)"),
                )
                .required(vec!["input_file", "output_format"]),
        )
    }

    async fn execute(&self, arguments: Value) -> anyhow::Result<CallToolResult> {
        into_call_result(self.run(arguments).await)
    }
}
