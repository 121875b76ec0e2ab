//! In-place gzip compaction of finished build logs.
//!
//! Once a run is finalized its log is never appended to again, so it can be
//! swapped for a gzip-compressed copy under the same name. The swap is:
//!
//! 1. Sniff the header; an already-gzipped log is left alone
//! 2. Check the caller-supplied enabled flag and the canonical file name
//! 3. Stream the log into a `log.gz` side file
//! 4. Delete the original and rename the side file over it
//!
//! Failures never escape [`LogCompactor::compact`]: they are logged and
//! reported as [`Outcome::Failed`] so a host event handler cannot be broken
//! by a bad log directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use buildlog_compactor::{CompactorConfig, LogCompactor, Outcome};
//! use std::path::Path;
//!
//! let compactor = LogCompactor::new(CompactorConfig::default());
//! let outcome = compactor.compact(Path::new("/var/lib/ci/jobs/app/builds/42/log"), true);
//! assert!(!outcome.is_failure());
//! ```

pub mod compactor;
pub mod compress;
pub mod config;
pub mod detect;
pub mod fs;
pub mod listener;
pub mod outcome;

pub use compactor::{LogCompactor, side_file_path};
pub use compress::gzip_copy;
pub use config::{CompactorConfig, ConfigError, RetryPolicy};
pub use detect::{GZIP_MAGIC, has_gzip_magic, is_gzip_file};
pub use fs::{LogFs, OsFs};
pub use listener::{CompressBuildLogListener, FinalizedRun, RunListener};
pub use outcome::{CompactReport, FailureKind, Outcome, SkipReason};

use std::path::PathBuf;
use thiserror::Error;

/// The only file name the compactor acts on.
pub const CANONICAL_LOG_NAME: &str = "log";

/// Suffix appended to the log name to form the side file.
pub const GZIP_SUFFIX: &str = ".gz";

#[derive(Error, Debug)]
pub enum CompactError {
    #[error("Failed to compress {path} to {side_file}: {source}")]
    Compression {
        path: PathBuf,
        side_file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to delete {path} after compression: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompactError {
    /// Failure category reported to callers.
    pub fn kind(&self) -> FailureKind {
        match self {
            CompactError::Compression { .. } => FailureKind::CompressionError,
            CompactError::Delete { .. } => FailureKind::DeleteError,
            CompactError::Rename { .. } => FailureKind::RenameError,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompactError>;
