//! Inspect command: report compression state of logs.
//!
//! A `log.gz` next to a `log` means a previous run could not delete the
//! original; a `log.gz` with no `log` means the rename failed. Both need a
//! manual cleanup, so they are surfaced here.

use anyhow::Result;
use buildlog_compactor::{is_gzip_file, side_file_path};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::compact_cmd::format_size;

/// Arguments for the inspect command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Log files to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Observed state of one log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub size: Option<u64>,
    pub compressed: Option<bool>,
    pub side_file_present: bool,
}

impl LogStatus {
    /// The log is in one of the half-finished states a failed compaction leaves.
    pub fn needs_cleanup(&self) -> bool {
        self.side_file_present
    }
}

/// Inspect a single log path.
pub fn inspect(path: &Path) -> LogStatus {
    let metadata = std::fs::metadata(path).ok().filter(|m| m.is_file());
    LogStatus {
        path: path.to_path_buf(),
        exists: metadata.is_some(),
        size: metadata.as_ref().map(|m| m.len()),
        compressed: metadata.and_then(|_| is_gzip_file(path).ok()),
        side_file_present: side_file_path(path).is_file(),
    }
}

impl InspectArgs {
    /// Run the inspect command. Returns `false` if any log needs cleanup.
    pub fn run(self) -> Result<bool> {
        let statuses: Vec<LogStatus> = self.paths.iter().map(|p| inspect(p)).collect();
        let clean = !statuses.iter().any(LogStatus::needs_cleanup);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
            return Ok(clean);
        }

        for status in &statuses {
            let state = match (status.exists, status.compressed) {
                (false, _) => "missing".to_string(),
                (true, Some(true)) => "gzip".to_string(),
                (true, Some(false)) => "plain".to_string(),
                (true, None) => "unreadable".to_string(),
            };
            let size = status.size.map(format_size).unwrap_or_default();
            println!("{}: {} {}", status.path.display(), state, size);
            if status.needs_cleanup() {
                println!(
                    "  ⚠️  leftover side file {}",
                    side_file_path(&status.path).display()
                );
            }
        }

        Ok(clean)
    }
}
