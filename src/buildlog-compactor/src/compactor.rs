//! Compaction of a single finished log.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::compress::gzip_copy;
use crate::config::CompactorConfig;
use crate::detect::has_gzip_magic;
use crate::fs::{LogFs, OsFs};
use crate::outcome::{CompactReport, Outcome, SkipReason};
use crate::{CompactError, GZIP_SUFFIX, Result};

/// Replaces a finished plain-text log with a gzip-compressed one.
pub struct LogCompactor<F: LogFs = OsFs> {
    config: CompactorConfig,
    fs: F,
}

impl LogCompactor<OsFs> {
    pub fn new(config: CompactorConfig) -> Self {
        Self::with_fs(config, OsFs)
    }
}

impl<F: LogFs> LogCompactor<F> {
    /// Create a compactor over a custom filesystem.
    pub fn with_fs(config: CompactorConfig, fs: F) -> Self {
        Self { config, fs }
    }

    /// Compress the log at `path` in place if `enabled` and not already compressed.
    ///
    /// Never fails: errors are logged and reported through the outcome.
    pub fn compact(&self, path: &Path, enabled: bool) -> Outcome {
        self.compact_with_report(path, enabled).outcome
    }

    /// Like [`compact`](Self::compact), also returning the observed byte counts.
    pub fn compact_with_report(&self, path: &Path, enabled: bool) -> CompactReport {
        let mut report = CompactReport::new(path.to_path_buf());

        if self.is_already_compressed(path) {
            trace!(path = %path.display(), "Skipping log, already compressed");
            return report.finish(Outcome::Skipped(SkipReason::AlreadyCompressed));
        }
        trace!(path = %path.display(), "Log is not gzip, attempting to compress");

        if !enabled {
            trace!(
                path = %path.display(),
                "Skipping log, owner is not configured to have compressed logs"
            );
            return report.finish(Outcome::Skipped(SkipReason::NotConfigured));
        }

        if !self.is_canonical(path) {
            trace!(
                path = %path.display(),
                canonical = %self.config.canonical_name,
                "Skipping log, not the canonical log file"
            );
            return report.finish(Outcome::Skipped(SkipReason::NonCanonicalName));
        }

        let side_file = side_file_path(path);

        if self.config.dry_run {
            info!(
                path = %path.display(),
                side_file = %side_file.display(),
                "[DRY RUN] Would compress build log"
            );
            return report.finish(Outcome::Skipped(SkipReason::DryRun));
        }

        match self.replace(path, &side_file, &mut report) {
            Ok(()) => {
                debug!(
                    path = %path.display(),
                    original_len = report.original_len,
                    compressed_len = report.compressed_len,
                    "Replaced build log with compressed copy"
                );
                report.finish(Outcome::Succeeded)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Build log compaction failed");
                report.finish(Outcome::Failed(e.kind()))
            }
        }
    }

    /// Compress to the side file, delete the original, promote the side file.
    fn replace(&self, path: &Path, side_file: &Path, report: &mut CompactReport) -> Result<()> {
        let copied = self.compress(path, side_file, report)?;
        report.bytes_copied = Some(copied);

        if let Some(expected) = report.original_len
            && expected != copied
        {
            warn!(
                path = %path.display(),
                expected,
                copied,
                "Expected to copy {} bytes but copied {}",
                expected,
                copied
            );
        }

        self.with_retry("delete", path, || self.fs.remove_file(path))
            .map_err(|source| CompactError::Delete {
                path: path.to_path_buf(),
                source,
            })?;

        self.with_retry("rename", side_file, || self.fs.rename(side_file, path))
            .map_err(|source| CompactError::Rename {
                from: side_file.to_path_buf(),
                to: path.to_path_buf(),
                source,
            })?;

        Ok(())
    }

    /// Stream the log into the side file. Handles are dropped before returning.
    fn compress(&self, path: &Path, side_file: &Path, report: &mut CompactReport) -> Result<u64> {
        let wrap = |source: io::Error| CompactError::Compression {
            path: path.to_path_buf(),
            side_file: side_file.to_path_buf(),
            source,
        };

        debug!(path = %path.display(), "Compressing build log");

        let original_len = self.fs.file_len(path).map_err(wrap)?;
        report.original_len = Some(original_len);

        let copied = {
            let reader = self.fs.open_read(path).map_err(wrap)?;
            let writer = self.fs.create(side_file).map_err(wrap)?;
            gzip_copy(reader, writer, self.config.compression_level).map_err(wrap)?
        };

        report.compressed_len = self.fs.file_len(side_file).ok();
        debug!(
            path = %path.display(),
            side_file = %side_file.display(),
            copied,
            "Finished compressing build log"
        );

        Ok(copied)
    }

    fn is_already_compressed(&self, path: &Path) -> bool {
        match self.fs.open_read(path).and_then(has_gzip_magic) {
            Ok(compressed) => compressed,
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "Could not read log header, treating as uncompressed"
                );
                false
            }
        }
    }

    fn is_canonical(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == self.config.canonical_name)
    }

    /// Run `op` up to `retry.attempts` times with linear backoff.
    fn with_retry<T>(
        &self,
        step: &str,
        path: &Path,
        mut op: impl FnMut() -> io::Result<T>,
    ) -> io::Result<T> {
        let policy = &self.config.retry;
        let attempts = policy.attempts.max(1);
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    warn!(
                        step,
                        path = %path.display(),
                        attempt,
                        attempts,
                        error = %e,
                        "Build log {} failed, retrying",
                        step
                    );
                    thread::sleep(Duration::from_millis(
                        policy.backoff_ms.saturating_mul(u64::from(attempt)),
                    ));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `<dir>/<name>.gz` next to the log.
pub fn side_file_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(GZIP_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::outcome::FailureKind;
    use std::fs;
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;
    use tracing_test::traced_test;

    const CONTENT: &str = "Started by user admin\nBuilding in workspace /ws\nFinished: SUCCESS\n";

    fn create_log(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, CONTENT).unwrap();
        path
    }

    /// Reads at most `limit` bytes of any file opened for compression.
    struct TruncatingFs {
        limit: u64,
    }

    impl LogFs for TruncatingFs {
        fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>> {
            Ok(Box::new(fs::File::open(path)?.take(self.limit)))
        }

        fn create(&self, path: &Path) -> io::Result<Box<dyn Write>> {
            OsFs.create(path)
        }

        fn file_len(&self, path: &Path) -> io::Result<u64> {
            OsFs.file_len(path)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            OsFs.remove_file(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            OsFs.rename(from, to)
        }
    }

    /// Fails the first `failures` deletes.
    struct FlakyDeleteFs {
        failures: u32,
        calls: AtomicU32,
    }

    impl LogFs for FlakyDeleteFs {
        fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>> {
            OsFs.open_read(path)
        }

        fn create(&self, path: &Path) -> io::Result<Box<dyn Write>> {
            OsFs.create(path)
        }

        fn file_len(&self, path: &Path) -> io::Result<u64> {
            OsFs.file_len(path)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "file is locked",
                ));
            }
            OsFs.remove_file(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            OsFs.rename(from, to)
        }
    }

    #[test]
    fn test_side_file_path() {
        assert_eq!(
            side_file_path(Path::new("/ci/builds/7/log")),
            PathBuf::from("/ci/builds/7/log.gz")
        );
    }

    #[test]
    #[traced_test]
    fn test_byte_count_mismatch_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_log(temp_dir.path(), "log");

        let compactor =
            LogCompactor::with_fs(CompactorConfig::default(), TruncatingFs { limit: 10 });
        let report = compactor.compact_with_report(&path, true);

        assert_eq!(report.outcome, Outcome::Succeeded);
        assert!(report.byte_count_mismatch());
        assert_eq!(report.bytes_copied, Some(10));
        assert_eq!(report.original_len, Some(CONTENT.len() as u64));
        assert!(!side_file_path(&path).exists());
        assert!(logs_contain("Expected to copy"));
    }

    #[test]
    #[traced_test]
    fn test_delete_failure_is_logged() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_log(temp_dir.path(), "log");

        let fs = FlakyDeleteFs {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let config = CompactorConfig {
            retry: RetryPolicy::none(),
            ..Default::default()
        };
        let compactor = LogCompactor::with_fs(config, fs);

        assert_eq!(
            compactor.compact(&path, true),
            Outcome::Failed(FailureKind::DeleteError)
        );
        assert!(logs_contain("Build log compaction failed"));
        assert_eq!(compactor.fs.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_recovers_from_transient_delete_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_log(temp_dir.path(), "log");

        let config = CompactorConfig {
            retry: RetryPolicy {
                attempts: 3,
                backoff_ms: 1,
            },
            ..Default::default()
        };
        let fs = FlakyDeleteFs {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let compactor = LogCompactor::with_fs(config, fs);

        assert_eq!(compactor.compact(&path, true), Outcome::Succeeded);
        assert_eq!(compactor.fs.calls.load(Ordering::SeqCst), 3);
        assert!(crate::is_gzip_file(&path).unwrap());
    }

    #[test]
    fn test_retry_gives_up_after_attempts() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_log(temp_dir.path(), "log");

        let config = CompactorConfig {
            retry: RetryPolicy {
                attempts: 2,
                backoff_ms: 1,
            },
            ..Default::default()
        };
        let fs = FlakyDeleteFs {
            failures: 5,
            calls: AtomicU32::new(0),
        };
        let compactor = LogCompactor::with_fs(config, fs);

        assert_eq!(
            compactor.compact(&path, true),
            Outcome::Failed(FailureKind::DeleteError)
        );
        assert_eq!(compactor.fs.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_dry_run_leaves_log_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_log(temp_dir.path(), "log");

        let config = CompactorConfig {
            dry_run: true,
            ..Default::default()
        };
        let compactor = LogCompactor::new(config);

        assert_eq!(
            compactor.compact(&path, true),
            Outcome::Skipped(SkipReason::DryRun)
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), CONTENT);
        assert!(!side_file_path(&path).exists());
        assert!(logs_contain("[DRY RUN] Would compress build log"));
        assert!(logs_contain("side_file="));
    }

    #[test]
    fn test_missing_log_fails_compression() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log");

        let compactor = LogCompactor::new(CompactorConfig::default());
        assert_eq!(
            compactor.compact(&path, true),
            Outcome::Failed(FailureKind::CompressionError)
        );
    }

    #[test]
    fn test_custom_canonical_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_log(temp_dir.path(), "build.log");

        let config = CompactorConfig {
            canonical_name: "build.log".to_string(),
            ..Default::default()
        };
        let compactor = LogCompactor::new(config);

        assert_eq!(compactor.compact(&path, true), Outcome::Succeeded);
        assert!(crate::is_gzip_file(&path).unwrap());
    }
}
