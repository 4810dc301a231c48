//! Run and worker configuration.

use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default address the control server listens on.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:9090";

/// Default number of pool workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default time a forceful revoke waits before aborting a run.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Default number of finished runs kept for inspection.
pub const DEFAULT_RETAIN_FINISHED: usize = 256;

/// Configuration errors, raised before a run is queued.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Pacing interval is negative, not finite or too large for a duration.
    #[error("Invalid pacing interval: {0} (expected a non-negative number of seconds)")]
    InvalidPacing(f64),

    /// Editing grade out of range.
    #[error("Invalid editing grade: {0}")]
    InvalidEditingGrade(String),

    /// Model name not recognised.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Action name not recognised.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Duration string could not be parsed.
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Worker count must be at least one.
    #[error("Invalid worker count: {0}")]
    InvalidWorkers(usize),

    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`PoolConfig`].
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Parse duration string like "90s", "5m", "1h" or bare seconds "30".
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidDuration("empty duration string".to_string()));
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('h') {
        (stripped, 3600)
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 60)
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, 1)
    } else {
        (s, 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(s.to_string()))?;

    let secs = num
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::InvalidDuration(s.to_string()))?;
    Ok(Duration::from_secs(secs))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Worker pool and control server settings.
///
/// Loaded from a TOML file when `worker --config` is given:
///
/// ```toml
/// listen = "0.0.0.0:9090"
/// workers = 8
/// grace = "10s"
/// retain_finished = 100
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Control server bind address
    pub listen: String,
    /// Maximum number of concurrently executing runs
    pub workers: usize,
    /// How long a forceful revoke waits for a run to stop on its own
    #[serde(deserialize_with = "deserialize_duration")]
    pub grace: Duration,
    /// Finished runs kept in the run table; older ones are dropped
    pub retain_finished: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            workers: DEFAULT_WORKERS,
            grace: DEFAULT_GRACE,
            retain_finished: DEFAULT_RETAIN_FINISHED,
        }
    }
}

impl PoolConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers(self.workers));
        }
        Ok(())
    }
}
