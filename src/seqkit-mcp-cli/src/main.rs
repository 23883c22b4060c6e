//! seqkit-mcp - MCP server exposing the seqkit sequence toolkit.
//!
//! Subcommands:
//! - `serve` (default): speak MCP over stdio
//! - `tools`: print the tool catalog
//! - `check`: verify the seqkit executable is reachable
//!
//! Configuration comes from `SEQKIT_MCP_*` environment variables, with CLI
//! flags taking precedence. All diagnostics go to stderr; in serve mode
//! stdout belongs to the protocol.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use seqkit_mcp_engine::{ExecOptions, ProcessRunner, Settings, exec, seqkit_handlers};
use seqkit_mcp_server::McpServerBuilder;

const SERVER_NAME: &str = "seqkit-mcp";

const INSTRUCTIONS: &str = "Tools for FASTA/FASTQ files: statistics, subsequence \
extraction, searching, transformation, sorting, deduplication, random sampling, \
and format conversion. Input paths are resolved on the server's filesystem. \
Operations that write a file report the output path in their result.";

#[derive(Parser)]
#[command(name = SERVER_NAME, version, about = "MCP server for the seqkit sequence toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    overrides: SettingsOverrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (the default).
    Serve,
    /// Print the tool catalog.
    Tools {
        /// Emit the full definitions as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Verify the seqkit executable is reachable and report its version.
    Check,
}

/// CLI overrides on top of the `SEQKIT_MCP_*` environment.
#[derive(Args)]
struct SettingsOverrides {
    /// Path or name of the seqkit executable.
    #[arg(long, global = true, value_name = "PATH")]
    seqkit_path: Option<PathBuf>,

    /// Command timeout in seconds.
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Largest accepted input file in bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Captured-output cap per stream in bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    max_output_size: Option<usize>,

    /// Root directory for derived output files.
    #[arg(long, global = true, value_name = "DIR")]
    temp_dir: Option<PathBuf>,
}

fn apply_overrides(mut settings: Settings, overrides: &SettingsOverrides) -> Settings {
    if let Some(path) = &overrides.seqkit_path {
        settings.seqkit_path = path.clone();
    }
    if let Some(secs) = overrides.timeout {
        settings.timeout = Duration::from_secs(secs);
    }
    if let Some(bytes) = overrides.max_file_size {
        settings.max_file_size = bytes;
    }
    if let Some(bytes) = overrides.max_output_size {
        settings.max_output_size = bytes;
    }
    if let Some(dir) = &overrides.temp_dir {
        settings.temp_dir = dir.clone();
    }
    settings
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = apply_overrides(Settings::from_env()?, &cli.overrides);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Tools { json } => list_tools(settings, json),
        Commands::Check => check(settings).await,
    }
}

async fn serve(settings: Settings) -> Result<()> {
    info!(
        seqkit = %settings.seqkit_path.display(),
        timeout = ?settings.timeout,
        "Starting seqkit-mcp"
    );

    let handlers = seqkit_handlers(Arc::new(settings), Arc::new(ProcessRunner));
    let server = McpServerBuilder::new(SERVER_NAME, env!("CARGO_PKG_VERSION"))
        .instructions(INSTRUCTIONS)
        .tool_handlers(handlers)
        .build();

    server.run_stdio().await
}

fn list_tools(settings: Settings, json: bool) -> Result<()> {
    let handlers = seqkit_handlers(Arc::new(settings), Arc::new(ProcessRunner));
    let tools: Vec<_> = handlers.iter().map(|h| h.tool()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    for tool in tools {
        println!(
            "{:<16} {}",
            tool.name,
            tool.description.unwrap_or_default()
        );
    }
    Ok(())
}

async fn check(settings: Settings) -> Result<()> {
    let seqkit = settings.resolve_seqkit()?;
    println!("seqkit executable: {}", seqkit.display());

    let argv = vec![seqkit.display().to_string(), "version".to_string()];
    let options = ExecOptions {
        timeout: Duration::from_secs(10),
        ..ExecOptions::default()
    };
    let output = exec::run_command(&argv, &options).await?;

    if output.timed_out {
        bail!("seqkit version check timed out");
    }
    if output.exit_code != 0 {
        bail!("seqkit version check failed: {}", output.stderr.trim());
    }

    println!("{}", output.stdout.trim());
    Ok(())
}
