//! Config file loading and environment overrides.

use anyhow::{Context, Result};
use buildlog_compactor::CompactorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overrides the gzip level.
pub const ENV_COMPRESSION_LEVEL: &str = "BUILDLOG_COMPRESSION_LEVEL";
/// Overrides the number of delete/rename attempts.
pub const ENV_RETRY_ATTEMPTS: &str = "BUILDLOG_RETRY_ATTEMPTS";
/// Overrides the backoff between delete/rename attempts.
pub const ENV_RETRY_BACKOFF_MS: &str = "BUILDLOG_RETRY_BACKOFF_MS";

/// On-disk config file layout.
///
/// ```toml
/// [compactor]
/// compression_level = 9
///
/// [compactor.retry]
/// attempts = 3
/// backoff_ms = 200
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub compactor: CompactorConfig,
}

impl FileConfig {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

/// Build the compactor config from an optional file plus environment.
pub fn load_config(path: Option<&Path>) -> Result<CompactorConfig> {
    let mut config = match path {
        Some(path) => FileConfig::load(path)?.compactor,
        None => CompactorConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Apply `BUILDLOG_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut CompactorConfig) -> Result<()> {
    if let Some(level) = env_var(ENV_COMPRESSION_LEVEL) {
        config.compression_level = level
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", ENV_COMPRESSION_LEVEL, level))?;
    }

    if let Some(attempts) = env_var(ENV_RETRY_ATTEMPTS) {
        config.retry.attempts = attempts
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", ENV_RETRY_ATTEMPTS, attempts))?;
    }

    if let Some(backoff) = env_var(ENV_RETRY_BACKOFF_MS) {
        config.retry.backoff_ms = backoff
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", ENV_RETRY_BACKOFF_MS, backoff))?;
    }

    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
