// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dagbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagbuild",
    version,
    about = "Simulate a concurrent build of interdependent tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build manifest (TOML).
    ///
    /// Default: `Build.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Build.toml")]
    pub manifest: String,

    /// Number of workers; overrides `[settings].workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the plan, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
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
