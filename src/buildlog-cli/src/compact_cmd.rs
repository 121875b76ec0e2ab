//! Compact command: compress finished logs in place.

use anyhow::Result;
use buildlog_compactor::{CompactReport, CompactorConfig, LogCompactor, Outcome};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the compact command.
#[derive(Debug, Args)]
pub struct CompactArgs {
    /// Log files of finalized runs
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Treat the owning job as not configured for compression
    #[arg(long)]
    pub disabled: bool,

    /// Dry run - show what would be compressed without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Gzip compression level (0-9)
    #[arg(long)]
    pub level: Option<u32>,

    /// Total delete/rename attempts (1 = no retry)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CompactArgs {
    /// Fold command-line flags into the loaded config.
    pub fn apply_to(&self, mut config: CompactorConfig) -> Result<CompactorConfig> {
        if let Some(level) = self.level {
            config.compression_level = level;
        }
        if let Some(attempts) = self.retries {
            config.retry.attempts = attempts;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        config.validate()?;
        Ok(config)
    }

    /// Compact every path and collect the reports.
    pub fn compact_all(&self, config: CompactorConfig) -> Result<Vec<CompactReport>> {
        let compactor = LogCompactor::new(self.apply_to(config)?);
        let enabled = !self.disabled;

        Ok(self
            .paths
            .iter()
            .map(|path| compactor.compact_with_report(path, enabled))
            .collect())
    }

    /// Run the compact command. Returns `false` if any log failed.
    pub fn run(self, config: CompactorConfig) -> Result<bool> {
        let reports = self.compact_all(config)?;
        let all_ok = !reports.iter().any(|r| r.outcome.is_failure());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
            return Ok(all_ok);
        }

        for report in &reports {
            println!("{}", format_report(report));
        }

        let compressed = reports.iter().filter(|r| r.outcome.is_success()).count();
        info!(total = reports.len(), compressed, "Compaction finished");

        Ok(all_ok)
    }
}

fn format_report(report: &CompactReport) -> String {
    match (report.outcome, report.original_len, report.compressed_len) {
        (Outcome::Succeeded, Some(before), Some(after)) => format!(
            "{}: {} ({} -> {})",
            report.path.display(),
            report.outcome,
            format_size(before),
            format_size(after)
        ),
        _ => format!("{}: {}", report.path.display(), report.outcome),
    }
}

/// Format bytes as human-readable string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
