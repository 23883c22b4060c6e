//! Sequence transformation (`seqkit seq`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqkit_mcp_server::ToolHandler;
use seqkit_mcp_types::{CallToolResult, PropertySchema, Tool, ToolInputSchema};

use crate::error::{EngineError, Result};
use crate::toolkit::ToolRuntime;
use crate::toolkit::output::resolve_output_path;
use crate::toolkit::rules::{self, ArgRule};
use crate::toolkit::validate::check_input_file;

use super::{into_call_result, output_stats, parse_args, run_seqkit, to_map};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeqArgs {
    input_file: PathBuf,
    #[serde(default)]
    reverse: bool,
    #[serde(default)]
    complement: bool,
    #[serde(default)]
    reverse_complement: bool,
    #[serde(default)]
    rna2dna: bool,
    #[serde(default)]
    dna2rna: bool,
    #[serde(default)]
    translate: bool,
    min_length: Option<u64>,
    max_length: Option<u64>,
    output_file: Option<PathBuf>,
}

const RULES: &[ArgRule] = &[
    ArgRule::Switch {
        param: "reverse",
        flags: &["-r"],
    },
    ArgRule::Switch {
        param: "complement",
        flags: &["-p"],
    },
    ArgRule::Switch {
        param: "reverse_complement",
        flags: &["-r", "-p"],
    },
    ArgRule::Switch {
        param: "rna2dna",
        flags: &["--rna2dna"],
    },
    ArgRule::Switch {
        param: "dna2rna",
        flags: &["--dna2rna"],
    },
    ArgRule::Switch {
        param: "translate",
        flags: &["-t"],
    },
    ArgRule::Value {
        param: "min_length",
        flag: "-m",
    },
    ArgRule::Value {
        param: "max_length",
        flag: "-M",
    },
];

/// Human-readable names for the summary line, in table order.
const TRANSFORMATION_LABELS: &[(&str, &str)] = &[
    ("reverse", "reverse"),
    ("complement", "complement"),
    ("reverse_complement", "reverse complement"),
    ("rna2dna", "RNA to DNA"),
    ("dna2rna", "DNA to RNA"),
    ("translate", "translate to protein"),
];

pub struct SeqHandler {
    runtime: ToolRuntime,
}

impl SeqHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let args: SeqArgs = parse_args(arguments)?;

        if let (Some(min), Some(max)) = (args.min_length, args.max_length)
            && min > max
        {
            return Err(EngineError::Validation(format!(
                "'min_length' ({min}) must not exceed 'max_length' ({max})"
            )));
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "transformed",
            None,
        )?;

        let arg_map = to_map(&args)?;
        let mut argv = self.runtime.seqkit_argv("seq");
        rules::apply(RULES, &arg_map, &mut argv)?;
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, "seq", argv).await?;
        let stats = output_stats(&self.runtime, &output).await;

        let transformations: Vec<&str> = TRANSFORMATION_LABELS
            .iter()
            .filter(|(param, _)| arg_map.get(*param) == Some(&Value::Bool(true)))
            .map(|(_, label)| *label)
            .collect();
        let applied = if transformations.is_empty() {
            "filtering only".to_string()
        } else {
            transformations.join(", ")
        };

        Ok(format!(
            "Sequence transformation completed!\n\n\
             Output file: {}\n\
             Transformations: {}\n\n\
             Output statistics:\n{}",
            output.display(),
            applied,
            stats
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SeqHandler {
    fn tool(&self) -> Tool {
        Tool::new(
            "seqkit_seq",
            "Transform sequences (reverse, complement, etc.)",
        )
        .with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "reverse",
                    PropertySchema::boolean()
                        .description("Reverse sequence")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "complement",
                    PropertySchema::boolean()
                        .description("Complement sequence")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "reverse_complement",
                    PropertySchema::boolean()
                        .description("Reverse complement sequence")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "rna2dna",
                    PropertySchema::boolean()
                        .description("Convert RNA to DNA")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "dna2rna",
                    PropertySchema::boolean()
                        .description("Convert DNA to RNA")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "translate",
                    PropertySchema::boolean()
                        .description("Translate to protein")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "min_length",
                    PropertySchema::integer()
                        .description("Minimum sequence length filter")
                        .min(0.0),
                )
                .property(
                    "max_length",
                    PropertySchema::integer()
                        .description("Maximum sequence length filter")
                        .min(0.0),
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::error::EngineError;
    use crate::toolkit::testing::{
        FASTA_FIXTURE, RecordingRunner, test_runtime, write_fixture,
    };

    use super::*;

    #[tokio::test]
    async fn reverse_complement_expands_to_both_flags() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SeqHandler::new(runtime)
            .run(json!({ "input_file": input, "reverse_complement": true }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert!(argv.contains(&"-r".to_string()));
        assert!(argv.contains(&"-p".to_string()));
        assert!(summary.contains("Transformations: reverse complement"));
    }

    #[tokio::test]
    async fn length_filters_render_as_values() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SeqHandler::new(runtime)
            .run(json!({ "input_file": input, "min_length": 50, "max_length": 500 }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        let min_at = argv.iter().position(|a| a == "-m").unwrap();
        assert_eq!(argv[min_at + 1], "50");
        let max_at = argv.iter().position(|a| a == "-M").unwrap();
        assert_eq!(argv[max_at + 1], "500");
        assert!(summary.contains("Transformations: filtering only"));
    }

    #[tokio::test]
    async fn inverted_length_bounds_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SeqHandler::new(runtime)
            .run(json!({ "input_file": input, "min_length": 500, "max_length": 50 }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn multiple_transformations_are_listed_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, _) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SeqHandler::new(runtime)
            .run(json!({ "input_file": input, "rna2dna": true, "translate": true }))
            .await
            .unwrap();

        assert!(summary.contains("Transformations: RNA to DNA, translate to protein"));
    }
}
