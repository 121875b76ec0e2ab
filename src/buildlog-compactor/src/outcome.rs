//! Result of a single compaction.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a log was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file already starts with the gzip magic bytes.
    AlreadyCompressed,
    /// Compression is not enabled for the run's owner.
    NotConfigured,
    /// The file is not the canonical log (e.g. a rotated `log.1`).
    NonCanonicalName,
    /// Dry run: the log would have been compressed.
    DryRun,
}

/// Which step of the replacement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Reading, encoding or writing the side file failed. The original is intact.
    CompressionError,
    /// The original could not be deleted. Both `log` and `log.gz` exist.
    DeleteError,
    /// The side file could not be renamed. Only `log.gz` exists.
    RenameError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Skipped(SkipReason),
    Failed(FailureKind),
    Succeeded,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::AlreadyCompressed => "already compressed",
            SkipReason::NotConfigured => "compression not configured",
            SkipReason::NonCanonicalName => "not the canonical log file",
            SkipReason::DryRun => "dry run",
        };
        f.write_str(s)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::CompressionError => "compression failed",
            FailureKind::DeleteError => "could not delete original",
            FailureKind::RenameError => "could not rename side file",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            Outcome::Failed(kind) => write!(f, "failed ({})", kind),
            Outcome::Succeeded => f.write_str("compressed"),
        }
    }
}

/// Outcome plus the byte counts observed along the way.
#[derive(Debug, Clone, Serialize)]
pub struct CompactReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Length of the log right before compression started.
    pub original_len: Option<u64>,
    /// Bytes read from the log into the encoder.
    pub bytes_copied: Option<u64>,
    /// Length of the side file after the encoder finished.
    pub compressed_len: Option<u64>,
}

impl CompactReport {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            outcome: Outcome::Succeeded,
            original_len: None,
            bytes_copied: None,
            compressed_len: None,
        }
    }

    pub(crate) fn finish(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// True when the copied byte count differs from the pre-compression length.
    pub fn byte_count_mismatch(&self) -> bool {
        match (self.original_len, self.bytes_copied) {
            (Some(expected), Some(copied)) => expected != copied,
            _ => false,
        }
    }
}
