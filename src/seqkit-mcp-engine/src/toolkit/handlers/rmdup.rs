//! Duplicate removal (`seqkit rmdup`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seqkit_mcp_server::ToolHandler;
use seqkit_mcp_types::{CallToolResult, PropertySchema, Tool, ToolInputSchema};

use crate::error::Result;
use crate::toolkit::ToolRuntime;
use crate::toolkit::output::resolve_output_path;
use crate::toolkit::rules::{self, ArgRule};
use crate::toolkit::validate::check_input_file;

use super::{into_call_result, parse_args, run_seqkit, to_map};

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RmdupArgs {
    input_file: PathBuf,
    #[serde(default)]
    by_name: bool,
    #[serde(default = "default_true")]
    by_seq: bool,
    #[serde(default)]
    ignore_case: bool,
    output_file: Option<PathBuf>,
}

const RULES: &[ArgRule] = &[
    ArgRule::Switch {
        param: "by_name",
        flags: &["-n"],
    },
    ArgRule::Switch {
        param: "by_seq",
        flags: &["-s"],
    },
    ArgRule::Switch {
        param: "ignore_case",
        flags: &["-i"],
    },
];

pub struct RmdupHandler {
    runtime: ToolRuntime,
}

impl RmdupHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let mut args: RmdupArgs = parse_args(arguments)?;

        // Name-based dedup wins; seqkit treats the two keys as alternatives.
        if args.by_name {
            args.by_seq = false;
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "rmdup",
            None,
        )?;

        let mut argv = self.runtime.seqkit_argv("rmdup");
        rules::apply(RULES, &to_map(&args)?, &mut argv)?;
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, "rmdup", argv).await?;

        Ok(format!(
            "Duplicate removal completed!\n\n\
             Output file: {}\n\
             Duplicates removed by: {}",
            output.display(),
            if args.by_name { "name" } else { "sequence" }
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for RmdupHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_rmdup", "Remove duplicate sequences").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "by_name",
                    PropertySchema::boolean()
                        .description("Remove duplicates by sequence name")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "by_seq",
                    PropertySchema::boolean()
                        .description("Remove duplicates by sequence")
                        .default_value(Value::Bool(true)),
                )
                .property(
                    "ignore_case",
                    PropertySchema::boolean()
                        .description("Ignore case when comparing")
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::toolkit::testing::{
        FASTA_FIXTURE, RecordingRunner, test_runtime, write_fixture,
    };

    use super::*;

    #[tokio::test]
    async fn defaults_to_sequence_dedup() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = RmdupHandler::new(runtime)
            .run(json!({ "input_file": input }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert_eq!(&argv[..2], &["seqkit", "rmdup"]);
        assert!(argv.contains(&"-s".to_string()));
        assert!(!argv.contains(&"-n".to_string()));
        assert!(summary.contains("Duplicates removed by: sequence"));
    }

    #[tokio::test]
    async fn by_name_takes_precedence_over_by_seq() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = RmdupHandler::new(runtime)
            .run(json!({ "input_file": input, "by_name": true, "by_seq": true }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert!(argv.contains(&"-n".to_string()));
        assert!(!argv.contains(&"-s".to_string()));
        assert!(summary.contains("Duplicates removed by: name"));
    }

    #[tokio::test]
    async fn ignore_case_adds_i_flag() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        RmdupHandler::new(runtime)
            .run(json!({ "input_file": input, "ignore_case": true }))
            .await
            .unwrap();

        assert!(runner.argv(0).contains(&"-i".to_string()));
    }

    #[tokio::test]
    async fn identical_requests_build_identical_invocations() {
        // Dedup is idempotent downstream; at this layer the guarantee is
        // that the same request always produces the same flag sequence.
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let out = temp.path().join("dedup.fa");
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());
        let handler = RmdupHandler::new(runtime);

        let request = json!({ "input_file": input, "output_file": out });
        handler.run(request.clone()).await.unwrap();
        handler.run(request).await.unwrap();

        assert_eq!(runner.argv(0), runner.argv(1));
    }
}
