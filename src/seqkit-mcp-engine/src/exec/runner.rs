//! Subprocess spawning, capture, and timeout enforcement.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::settings::{DEFAULT_MAX_OUTPUT_SIZE, DEFAULT_TIMEOUT};

/// How long a terminated child gets to exit on SIGTERM before SIGKILL.
const TERM_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Variable-name fragments that mark sensitive data (case-insensitive).
/// Matching variables are withheld from the child environment.
const SENSITIVE_PATTERNS: &[&str] = &["KEY", "SECRET", "TOKEN", "PASSWORD", "CREDENTIAL", "PRIVATE"];

/// Options for one command execution.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Working directory for the child.
    pub cwd: PathBuf,
    /// Wall-clock limit.
    pub timeout: Duration,
    /// Per-stream capture limit in bytes.
    pub max_output_size: usize,
    /// Optional payload piped to the child's stdin, which is otherwise null.
    pub stdin: Option<Vec<u8>>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            timeout: DEFAULT_TIMEOUT,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
            stdin: None,
        }
    }
}

/// Captured result of one command execution.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
    /// True when either stream hit the capture limit.
    pub truncated: bool,
    /// True when the child was terminated for exceeding the timeout.
    pub timed_out: bool,
}

/// Execute an argument vector to completion or timeout.
///
/// The first element is the program; the rest are its arguments, passed
/// verbatim. There is no shell anywhere in this path, so metacharacters in
/// user-supplied patterns or paths carry no meaning.
pub async fn run_command(argv: &[String], options: &ExecOptions) -> Result<ExecOutput> {
    let Some((program, args)) = argv.split_first() else {
        return Err(EngineError::validation("empty argument vector"));
    };

    let start = Instant::now();
    debug!(program = %program, args = ?args, "Spawning command");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(&options.cwd)
        .stdin(if options.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    cmd.env_clear();
    cmd.envs(build_safe_environment());

    // Own process group, so termination reaches any grandchildren too.
    #[cfg(unix)]
    {
        unsafe {
            cmd.pre_exec(|| {
                if libc::setpgid(0, 0) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdin_pipe = child.stdin.take();
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let payload = options.stdin.clone();

    let result = tokio::time::timeout(options.timeout, async {
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        tokio::join!(
            async {
                // Dropping the handle closes the pipe, signalling EOF.
                if let (Some(mut sink), Some(bytes)) = (stdin_pipe, payload) {
                    let _ = sink.write_all(&bytes).await;
                }
            },
            async {
                if let Some(mut out) = stdout_pipe {
                    let _ = out.read_to_end(&mut stdout_buf).await;
                }
            },
            async {
                if let Some(mut err) = stderr_pipe {
                    let _ = err.read_to_end(&mut stderr_buf).await;
                }
            }
        );

        let status = child.wait().await;
        (stdout_buf, stderr_buf, status)
    })
    .await;

    match result {
        Ok((stdout_bytes, stderr_bytes, status)) => {
            let duration = start.elapsed();
            let exit_code = status.map(|s| s.code().unwrap_or(-1)).unwrap_or(-1);

            let (stdout, stdout_truncated) = capture(&stdout_bytes, options.max_output_size);
            let (stderr, stderr_truncated) = capture(&stderr_bytes, options.max_output_size);

            Ok(ExecOutput {
                stdout,
                stderr,
                exit_code,
                duration,
                truncated: stdout_truncated || stderr_truncated,
                timed_out: false,
            })
        }
        Err(_) => {
            warn!(program = %program, timeout = ?options.timeout, "Command timed out, terminating");
            terminate(&mut child).await;

            Ok(ExecOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: -1,
                duration: start.elapsed(),
                truncated: false,
                timed_out: true,
            })
        }
    }
}

/// SIGTERM the child's process group, grant a short grace period, then
/// SIGKILL whatever is left.
#[cfg(unix)]
async fn terminate(child: &mut tokio::process::Child) {
    if let Some(pid) = child.id() {
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGTERM);
        }
        if tokio::time::timeout(TERM_GRACE_PERIOD, child.wait())
            .await
            .is_ok()
        {
            return;
        }
    }
    let _ = child.kill().await;
}

#[cfg(not(unix))]
async fn terminate(child: &mut tokio::process::Child) {
    let _ = child.kill().await;
}

/// Decode captured bytes, truncating at the limit (on a char boundary) with
/// an explicit marker so truncation is never mistaken for real output.
fn capture(bytes: &[u8], limit: usize) -> (String, bool) {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= limit {
        return (text.into_owned(), false);
    }

    let mut cut = limit;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    (
        format!(
            "{}...\n[output truncated, {} bytes total]",
            &text[..cut],
            text.len()
        ),
        true,
    )
}

/// Child environment: the parent's, minus anything that looks like a
/// credential, with color and terminal handling pinned down.
fn build_safe_environment() -> HashMap<String, String> {
    let mut env: HashMap<String, String> = std::env::vars()
        .filter(|(key, _)| !is_sensitive(key))
        .collect();

    env.insert("NO_COLOR".to_string(), "1".to_string());
    env.insert("TERM".to_string(), "dumb".to_string());

    env
}

pub(crate) fn is_sensitive(key: &str) -> bool {
    let upper = key.to_uppercase();
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| upper.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn echo_captures_stdout() {
        let output = run_command(&argv(&["echo", "hello"]), &ExecOptions::default())
            .await
            .unwrap();

        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.contains("hello"));
        assert!(!output.timed_out);
        assert!(!output.truncated);
    }

    #[tokio::test]
    async fn nonzero_exit_code_is_reported() {
        let output = run_command(&argv(&["false"]), &ExecOptions::default())
            .await
            .unwrap();

        assert_ne!(output.exit_code, 0);
        assert!(!output.timed_out);
    }

    #[tokio::test]
    async fn timeout_terminates_the_child() {
        let start = Instant::now();
        let output = run_command(
            &argv(&["sleep", "30"]),
            &ExecOptions {
                timeout: Duration::from_millis(100),
                ..ExecOptions::default()
            },
        )
        .await
        .unwrap();

        assert!(output.timed_out);
        assert_eq!(output.exit_code, -1);
        // SIGTERM is enough for sleep; well under timeout + grace + kill.
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn oversized_output_is_truncated_and_flagged() {
        let output = run_command(
            &argv(&["head", "-c", "65536", "/dev/zero"]),
            &ExecOptions {
                max_output_size: 1024,
                ..ExecOptions::default()
            },
        )
        .await
        .unwrap();

        assert!(output.truncated);
        assert!(output.stdout.contains("output truncated"));
    }

    #[tokio::test]
    async fn stdin_payload_is_piped() {
        let output = run_command(
            &argv(&["cat"]),
            &ExecOptions {
                stdin: Some(b"ACGT".to_vec()),
                ..ExecOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout, "ACGT");
    }

    #[tokio::test]
    async fn empty_argv_is_a_validation_error() {
        let err = run_command(&[], &ExecOptions::default()).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = run_command(
            &argv(&["/definitely/not/a/real/binary"]),
            &ExecOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[test]
    fn sensitive_environment_variables_are_filtered() {
        assert!(is_sensitive("AWS_SECRET_ACCESS_KEY"));
        assert!(is_sensitive("github_token"));
        assert!(is_sensitive("DB_PASSWORD"));
        assert!(!is_sensitive("PATH"));
        assert!(!is_sensitive("HOME"));
    }

    #[test]
    fn capture_truncates_on_char_boundary() {
        let text = "séquence".repeat(100);
        let (captured, truncated) = capture(text.as_bytes(), 101);
        assert!(truncated);
        assert!(captured.contains("output truncated"));

        let (captured, truncated) = capture(b"short", 1024);
        assert_eq!(captured, "short");
        assert!(!truncated);
    }
}
