//! Buildlog CLI - Main entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use buildlog_cli::cli::{Cli, dispatch_command};
use buildlog_cli::logging::setup_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_filter_str(), cli.json_logs);

    match dispatch_command(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
