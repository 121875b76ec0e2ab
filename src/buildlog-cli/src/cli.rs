//! CLI argument structures and dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::compact_cmd::CompactArgs;
use crate::config::load_config;
use crate::inspect_cmd::InspectArgs;

/// Compress finished build logs in place.
#[derive(Debug, Parser)]
#[command(name = "buildlog")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity (overridden by RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compress finished logs, replacing each `log` with its gzip form
    Compact(CompactArgs),

    /// Show whether logs are compressed and whether side files were left behind
    Inspect(InspectArgs),
}

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors
    Warn,
    /// Show informational messages, warnings, and errors (default)
    #[default]
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including skip reasons
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Run the selected command. Returns `false` if any log failed to compact.
pub fn dispatch_command(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Compact(args) => {
            let config = load_config(cli.config.as_deref())?;
            args.run(config)
        }
        Commands::Inspect(args) => args.run(),
    }
}
