//! Random sampling (`seqkit sample`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqkit_mcp_server::ToolHandler;
use seqkit_mcp_types::{CallToolResult, PropertySchema, Tool, ToolInputSchema};

use crate::error::{EngineError, Result};
use crate::toolkit::ToolRuntime;
use crate::toolkit::output::resolve_output_path;
use crate::toolkit::rules::{self, ArgRule};
use crate::toolkit::validate::{check_input_file, exactly_one_of};

use super::{into_call_result, parse_args, run_seqkit, to_map};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SampleArgs {
    input_file: PathBuf,
    number: Option<u64>,
    proportion: Option<f64>,
    seed: Option<i64>,
    output_file: Option<PathBuf>,
}

const RULES: &[ArgRule] = &[
    ArgRule::Value {
        param: "number",
        flag: "-n",
    },
    ArgRule::Value {
        param: "proportion",
        flag: "-p",
    },
    ArgRule::Value {
        param: "seed",
        flag: "-s",
    },
];

pub struct SampleHandler {
    runtime: ToolRuntime,
}

impl SampleHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let args: SampleArgs = parse_args(arguments)?;

        exactly_one_of(&[
            ("number", args.number.is_some()),
            ("proportion", args.proportion.is_some()),
        ])?;
        if args.number == Some(0) {
            return Err(EngineError::validation("'number' must be at least 1"));
        }
        if let Some(p) = args.proportion
            && !(p > 0.0 && p <= 1.0)
        {
            return Err(EngineError::Validation(format!(
                "'proportion' must be within (0, 1], got {p}"
            )));
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "sampled",
            None,
        )?;

        let mut argv = self.runtime.seqkit_argv("sample");
        rules::apply(RULES, &to_map(&args)?, &mut argv)?;
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, "sample", argv).await?;

        let sample_size = match (args.number, args.proportion) {
            (Some(n), _) => format!("{n} sequences"),
            (None, Some(p)) => format!("{:.1}% of sequences", p * 100.0),
            (None, None) => unreachable!("validated above"),
        };
        let seed = args
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string());

        Ok(format!(
            "Sequence sampling completed!\n\n\
             Output file: {}\n\
             Sample size: {sample_size}\n\
             Seed: {seed}",
            output.display()
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SampleHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_sample", "Sample sequences randomly").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "number",
                    PropertySchema::integer()
                        .description("Number of sequences to sample")
                        .min(1.0),
                )
                .property(
                    "proportion",
                    PropertySchema::number()
                        .description("Proportion of sequences to sample (0-1)")
                        .min(0.0)
                        .max(1.0),
                )
                .property(
                    "seed",
                    PropertySchema::integer()
                        .description("Random seed for reproducible sampling"),
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
    async fn sampling_by_count_builds_expected_argv() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fq", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SampleHandler::new(runtime)
            .run(json!({ "input_file": input, "number": 100, "seed": 11 }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert_eq!(&argv[..2], &["seqkit", "sample"]);
        let n_at = argv.iter().position(|a| a == "-n").unwrap();
        assert_eq!(argv[n_at + 1], "100");
        let s_at = argv.iter().position(|a| a == "-s").unwrap();
        assert_eq!(argv[s_at + 1], "11");

        assert!(summary.contains("Sample size: 100 sequences"));
        assert!(summary.contains("Seed: 11"));
    }

    #[tokio::test]
    async fn sampling_by_proportion_uses_p_flag() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fq", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SampleHandler::new(runtime)
            .run(json!({ "input_file": input, "proportion": 0.25 }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        let p_at = argv.iter().position(|a| a == "-p").unwrap();
        assert_eq!(argv[p_at + 1], "0.25");
        assert!(summary.contains("Sample size: 25.0% of sequences"));
        assert!(summary.contains("Seed: random"));
    }

    #[tokio::test]
    async fn number_and_proportion_together_never_spawn() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fq", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SampleHandler::new(runtime)
            .run(json!({ "input_file": input, "number": 10, "proportion": 0.5 }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("mutually exclusive"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn neither_number_nor_proportion_never_spawns() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fq", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SampleHandler::new(runtime)
            .run(json!({ "input_file": input }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn out_of_range_proportion_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fq", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());
        let handler = SampleHandler::new(runtime);

        for bad in [1.5, 0.0, -0.1] {
            let err = handler
                .run(json!({ "input_file": input, "proportion": bad }))
                .await
                .unwrap_err();
            assert!(
                err.to_string().contains("proportion"),
                "proportion {bad} should be rejected"
            );
        }
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn zero_count_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fq", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SampleHandler::new(runtime)
            .run(json!({ "input_file": input, "number": 0 }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("at least 1"));
        assert_eq!(runner.call_count(), 0);
    }
}
