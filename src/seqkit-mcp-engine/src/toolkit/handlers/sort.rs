//! Sequence sorting (`seqkit sort`).

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

fn default_sort_by() -> String {
    "id".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SortArgs {
    input_file: PathBuf,
    #[serde(default = "default_sort_by")]
    sort_by: String,
    #[serde(default)]
    by_length: bool,
    #[serde(default)]
    reverse: bool,
    output_file: Option<PathBuf>,
}

const RULES: &[ArgRule] = &[
    ArgRule::Choice {
        param: "sort_by",
        choices: &[
            ("id", &[]),
            ("name", &["-n"]),
            ("seq", &["-s"]),
            ("length", &["-l"]),
        ],
    },
    ArgRule::Switch {
        param: "reverse",
        flags: &["-r"],
    },
];

pub struct SortHandler {
    runtime: ToolRuntime,
}

impl SortHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let mut args: SortArgs = parse_args(arguments)?;

        // `by_length` is shorthand that wins over the explicit key.
        if args.by_length {
            args.sort_by = "length".to_string();
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "sorted",
            None,
        )?;

        let mut argv = self.runtime.seqkit_argv("sort");
        rules::apply(RULES, &to_map(&args)?, &mut argv)?;
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, "sort", argv).await?;

        Ok(format!(
            "Sequence sorting completed!\n\n\
             Output file: {}\n\
             Sort key: {}\n\
             Reverse order: {}",
            output.display(),
            args.sort_by,
            args.reverse
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SortHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_sort", "Sort sequences by different criteria").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "sort_by",
                    PropertySchema::string()
                        .description("Sort criterion")
                        .enum_values(vec!["id", "name", "seq", "length"])
                        .default_value(Value::String("id".to_string())),
                )
                .property(
                    "by_length",
                    PropertySchema::boolean()
                        .description("Sort by sequence length")
                        .default_value(Value::Bool(false)),
                )
                .property(
                    "reverse",
                    PropertySchema::boolean()
                        .description("Reverse sort order")
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

    use crate::error::EngineError;
    use crate::toolkit::testing::{
        FASTA_FIXTURE, RecordingRunner, test_runtime, write_fixture,
    };

    use super::*;

    #[tokio::test]
    async fn default_sort_key_emits_no_flag() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SortHandler::new(runtime)
            .run(json!({ "input_file": input }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert_eq!(&argv[..2], &["seqkit", "sort"]);
        assert!(!argv.contains(&"-n".to_string()));
        assert!(!argv.contains(&"-l".to_string()));
        assert!(summary.contains("Sort key: id"));
    }

    #[tokio::test]
    async fn each_sort_key_maps_to_its_flag() {
        for (key, flag) in [("name", "-n"), ("seq", "-s"), ("length", "-l")] {
            let temp = tempfile::tempdir().unwrap();
            let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
            let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

            SortHandler::new(runtime)
                .run(json!({ "input_file": input, "sort_by": key }))
                .await
                .unwrap();

            assert!(
                runner.argv(0).contains(&flag.to_string()),
                "sort_by={key} should emit {flag}"
            );
        }
    }

    #[tokio::test]
    async fn by_length_overrides_the_sort_key() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SortHandler::new(runtime)
            .run(json!({ "input_file": input, "sort_by": "name", "by_length": true }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert!(argv.contains(&"-l".to_string()));
        assert!(!argv.contains(&"-n".to_string()));
        assert!(summary.contains("Sort key: length"));
    }

    #[tokio::test]
    async fn reverse_adds_r_flag() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SortHandler::new(runtime)
            .run(json!({ "input_file": input, "reverse": true }))
            .await
            .unwrap();

        assert!(runner.argv(0).contains(&"-r".to_string()));
        assert!(summary.contains("Reverse order: true"));
    }

    #[tokio::test]
    async fn unknown_sort_key_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "reads.fa", FASTA_FIXTURE);
        let (runtime, _) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SortHandler::new(runtime)
            .run(json!({ "input_file": input, "sort_by": "size" }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
    }
}
