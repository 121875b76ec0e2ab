//! Compactor configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CANONICAL_LOG_NAME;

/// Default gzip level, same as `flate2::Compression::default()`.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest level gzip accepts.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Default number of delete/rename attempts (no retry).
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;

/// Default pause between delete/rename attempts in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("canonical_name must not be empty")]
    EmptyCanonicalName,
    #[error("compression_level must be between 0 and {max}, got {got}")]
    CompressionLevel { got: u32, max: u32 },
    #[error("retry.attempts must be at least 1")]
    ZeroAttempts,
}

/// Configuration for [`crate::LogCompactor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactorConfig {
    /// File name that is eligible for compression.
    #[serde(default = "default_canonical_name")]
    pub canonical_name: String,

    /// Gzip compression level (0-9).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Retry policy for the delete and rename steps.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Run probe and gates only, never touch the filesystem.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_canonical_name() -> String {
    CANONICAL_LOG_NAME.to_string()
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            canonical_name: default_canonical_name(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            retry: RetryPolicy::default(),
            dry_run: false,
        }
    }
}

impl CompactorConfig {
    /// Reject values the compactor cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canonical_name.is_empty() {
            return Err(ConfigError::EmptyCanonicalName);
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(ConfigError::CompressionLevel {
                got: self.compression_level,
                max: MAX_COMPRESSION_LEVEL,
            });
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

/// Bounded retry around deleting the original and promoting the side file.
///
/// The default of a single attempt keeps the log-and-fail behavior. Raising
/// `attempts` is an opt-in change for filesystems where a just-closed handle
/// can make delete or rename fail spuriously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Base pause between attempts; attempt `n` waits `n * backoff_ms`.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            backoff_ms: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.attempts > 1
    }
}
