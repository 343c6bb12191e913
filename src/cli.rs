// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::exec::ExecMode;

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Run a dependency-ordered task set under different concurrency models.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskdag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Taskdag.toml")]
    pub config: String,

    /// Execution mode (sequential, threaded, process, cooperative).
    ///
    /// Overrides `mode` from the config file; defaults to sequential.
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ExecMode>,

    /// Worker pool size for the threaded and process modes.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Print the run report as JSON instead of a text summary.
    #[arg(long)]
    pub json: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Serve as an operation worker over stdin/stdout (process mode spawns
    /// these; not meant to be used directly).
    #[arg(long, hide = true)]
    pub worker: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
