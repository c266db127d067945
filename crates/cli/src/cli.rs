//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Scribe - replay concurrent edit sessions through a single serialized sink
#[derive(Parser, Debug)]
#[command(
    name = "scribe",
    author,
    version,
    about = "Replay concurrent edit sessions through a scribe",
    long_about = "Loads a session file describing producers and their edits, runs one \n\
                  thread per producer against a shared scribe, and prints the \n\
                  resulting grid with submission statistics."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SCRIBE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SCRIBE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a session file
    Run(RunArgs),

    /// Validate a session file without running it
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to session file (TOML or JSON)
    #[arg(short, long, default_value = "session.toml", env = "SCRIBE_SESSION")]
    pub config: PathBuf,

    /// Override the scribe lock timeout in milliseconds (0 = block)
    #[arg(long, env = "SCRIBE_LOCK_TIMEOUT_MS")]
    pub lock_timeout_ms: Option<u64>,

    /// Log every edit as the sink applies it
    #[arg(long)]
    pub trace_edits: bool,

    /// Keep submitting after a producer's edit is rejected
    #[arg(long)]
    pub keep_going: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SCRIBE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to session file to validate
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
