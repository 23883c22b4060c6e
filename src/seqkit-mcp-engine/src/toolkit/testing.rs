//! Test doubles and fixtures shared by the handler tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::exec::{CommandRunner, ExecOptions, ExecOutput};
use crate::settings::Settings;

use super::ToolRuntime;

/// Three records of differing lengths; enough for any handler test.
pub(crate) const FASTA_FIXTURE: &str = ">r1\nACGTACGT\n>r2\nAC\n>r3\nACGT\n";

pub(crate) fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Settings pointing all file side effects into the given directory.
pub(crate) fn test_settings(dir: &Path) -> Settings {
    Settings {
        temp_dir: dir.to_path_buf(),
        ..Settings::default()
    }
}

/// Runtime wired to a recording runner; returns both halves.
pub(crate) fn test_runtime(
    dir: &Path,
    runner: RecordingRunner,
) -> (ToolRuntime, Arc<RecordingRunner>) {
    let runner = Arc::new(runner);
    let runtime = ToolRuntime::new(Arc::new(test_settings(dir)), runner.clone());
    (runtime, runner)
}

fn ok_output(stdout: &str) -> ExecOutput {
    ExecOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: 0,
        duration: Duration::from_millis(5),
        truncated: false,
        timed_out: false,
    }
}

/// A runner that records every argument vector it is asked to execute and
/// replays canned outputs instead of spawning anything.
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    responses: Mutex<VecDeque<ExecOutput>>,
}

impl RecordingRunner {
    /// Succeeds on every call with empty stdout.
    pub(crate) fn ok() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    /// Replays the given outputs in order, then falls back to success.
    pub(crate) fn with_outputs(outputs: impl IntoIterator<Item = ExecOutput>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(outputs.into_iter().collect()),
        }
    }

    /// First call succeeds with the given stdout.
    pub(crate) fn with_stdout(stdout: &str) -> Self {
        Self::with_outputs([ok_output(stdout)])
    }

    /// First call fails with the given exit code and stderr.
    pub(crate) fn failing(exit_code: i32, stderr: &str) -> Self {
        Self::with_outputs([ExecOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code,
            duration: Duration::from_millis(5),
            truncated: false,
            timed_out: false,
        }])
    }

    /// First call times out.
    pub(crate) fn timing_out(elapsed: Duration) -> Self {
        Self::with_outputs([ExecOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            duration: elapsed,
            truncated: false,
            timed_out: true,
        }])
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn argv(&self, index: usize) -> Vec<String> {
        self.calls.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, argv: &[String], _options: &ExecOptions) -> Result<ExecOutput> {
        self.calls.lock().unwrap().push(argv.to_vec());
        let canned = self.responses.lock().unwrap().pop_front();
        Ok(canned.unwrap_or_else(|| ok_output("")))
    }
}
