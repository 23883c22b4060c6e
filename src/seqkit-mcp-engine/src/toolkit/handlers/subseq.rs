//! Subsequence extraction (`seqkit subseq`).

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
struct SubseqArgs {
    input_file: PathBuf,
    region: Option<String>,
    bed_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

const RULES: &[ArgRule] = &[
    ArgRule::Value {
        param: "region",
        flag: "-r",
    },
    ArgRule::Value {
        param: "bed_file",
        flag: "--bed",
    },
];

pub struct SubseqHandler {
    runtime: ToolRuntime,
}

impl SubseqHandler {
    pub(crate) fn new(runtime: ToolRuntime) -> Self {
        Self { runtime }
    }

    async fn run(&self, arguments: Value) -> Result<String> {
        let args: SubseqArgs = parse_args(arguments)?;

        // Supplying both would make the underlying semantics ambiguous, so
        // the combination is rejected instead of silently preferring one.
        exactly_one_of(&[
            ("region", args.region.is_some()),
            ("bed_file", args.bed_file.is_some()),
        ])?;
        if let Some(bed) = &args.bed_file {
            check_auxiliary_file(bed, "BED file")?;
        }
        check_input_file(&args.input_file, &self.runtime.settings)?;

        let output = resolve_output_path(
            &self.runtime.settings,
            args.output_file.as_deref(),
            &args.input_file,
            "subseq",
            None,
        )?;

        let mut argv = self.runtime.seqkit_argv("subseq");
        rules::apply(RULES, &to_map(&args)?, &mut argv)?;
        argv.push("-o".to_string());
        argv.push(output.display().to_string());
        argv.push(args.input_file.display().to_string());

        run_seqkit(&self.runtime, "subseq", argv).await?;
        let stats = output_stats(&self.runtime, &output).await;

        Ok(format!(
            "Subsequence extraction completed!\n\n\
             Output file: {}\n\
             Region: {}\n\n\
             Output statistics:\n{}",
            output.display(),
            args.region.as_deref().unwrap_or("BED file regions"),
            stats
        ))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SubseqHandler {
    fn tool(&self) -> Tool {
        Tool::new("seqkit_subseq", "Extract subsequences by region").with_schema(
            ToolInputSchema::object()
                .property(
                    "input_file",
                    PropertySchema::string().description("Path to FASTA/FASTQ file"),
                )
                .property(
                    "region",
                    PropertySchema::string()
                        .description("Region (e.g., '1:100-200' or 'chr1:1000-2000')"),
                )
                .property(
                    "bed_file",
                    PropertySchema::string().description("BED file with regions to extract"),
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
    async fn region_extraction_builds_argv_and_reports_stats() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "genome.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SubseqHandler::new(runtime)
            .run(json!({ "input_file": input, "region": "1:100-200" }))
            .await
            .unwrap();

        // One subseq call, one follow-up stats call on the output.
        assert_eq!(runner.call_count(), 2);

        let argv = runner.argv(0);
        assert_eq!(&argv[..4], &["seqkit", "subseq", "-r", "1:100-200"]);
        assert_eq!(argv[4], "-o");
        assert_eq!(argv[6], input.display().to_string());

        let stats_argv = runner.argv(1);
        assert_eq!(&stats_argv[..3], &["seqkit", "stats", "-T"]);
        assert_eq!(stats_argv[3], argv[5]);

        assert!(summary.contains("Region: 1:100-200"));
        assert!(summary.contains("Output file:"));
    }

    #[tokio::test]
    async fn bed_file_extraction_uses_bed_flag() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "genome.fa", FASTA_FIXTURE);
        let bed = write_fixture(temp.path(), "regions.bed", "chr1\t0\t100\n");
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SubseqHandler::new(runtime)
            .run(json!({ "input_file": input, "bed_file": bed }))
            .await
            .unwrap();

        let argv = runner.argv(0);
        assert!(argv.contains(&"--bed".to_string()));
        assert!(argv.contains(&bed.display().to_string()));
        assert!(summary.contains("Region: BED file regions"));
    }

    #[tokio::test]
    async fn region_and_bed_file_together_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "genome.fa", FASTA_FIXTURE);
        let bed = write_fixture(temp.path(), "regions.bed", "chr1\t0\t100\n");
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SubseqHandler::new(runtime)
            .run(json!({ "input_file": input, "region": "1:1-10", "bed_file": bed }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("mutually exclusive"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn neither_region_nor_bed_file_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "genome.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SubseqHandler::new(runtime)
            .run(json!({ "input_file": input }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("must be specified"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_bed_file_is_rejected_before_spawning() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "genome.fa", FASTA_FIXTURE);
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let err = SubseqHandler::new(runtime)
            .run(json!({ "input_file": input, "bed_file": "/no/such.bed" }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("BED file not found"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn caller_specified_output_path_is_used() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_fixture(temp.path(), "genome.fa", FASTA_FIXTURE);
        let requested = temp.path().join("extracted.fa");
        let (runtime, runner) = test_runtime(temp.path(), RecordingRunner::ok());

        let summary = SubseqHandler::new(runtime)
            .run(json!({
                "input_file": input,
                "region": "1:1-10",
                "output_file": requested,
            }))
            .await
            .unwrap();

        assert!(runner.argv(0).contains(&requested.display().to_string()));
        assert!(summary.contains(&requested.display().to_string()));
    }
}
