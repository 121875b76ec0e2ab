//! Host extension point for finalized runs.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::compactor::LogCompactor;
use crate::fs::{LogFs, OsFs};
use crate::outcome::Outcome;

/// A run whose log is fully written and will not be appended to again.
#[derive(Debug, Clone)]
pub struct FinalizedRun {
    /// Host identifier of the run, used only for diagnostics.
    pub id: String,
    /// Path to the run's log file.
    pub log_file: PathBuf,
    /// Whether the run's owner (or its parent owner) has compression turned on.
    pub compression_enabled: bool,
}

/// Receives run lifecycle events from the host.
///
/// Implementations must not fail: the host keeps doing its own bookkeeping
/// after the call regardless of what happened here.
pub trait RunListener: Send + Sync {
    fn on_finalized(&self, run: &FinalizedRun);
}

/// Compresses the log of every finalized run.
pub struct CompressBuildLogListener<F: LogFs = OsFs> {
    compactor: LogCompactor<F>,
}

impl<F: LogFs> CompressBuildLogListener<F> {
    pub fn new(compactor: LogCompactor<F>) -> Self {
        Self { compactor }
    }
}

impl<F: LogFs> RunListener for CompressBuildLogListener<F> {
    fn on_finalized(&self, run: &FinalizedRun) {
        match self
            .compactor
            .compact(&run.log_file, run.compression_enabled)
        {
            Outcome::Succeeded => info!(run = %run.id, "Compressed build log"),
            // Failures were already logged at warn by the compactor.
            outcome => debug!(
                run = %run.id,
                path = %run.log_file.display(),
                %outcome,
                "Build log left as is"
            ),
        }
    }
}
