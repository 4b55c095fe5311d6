//! CLI configuration
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables, then by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ha_introspection::AnalyzerOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_SNAPSHOT: &str = "HA_INSPECT_SNAPSHOT";
pub const ENV_TIMEOUT_SECS: &str = "HA_INSPECT_TIMEOUT_SECS";

/// Largest accepted `request_timeout_secs` (one day)
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Largest accepted `history_hours` (ten years)
pub const MAX_HISTORY_HOURS: u32 = 10 * 365 * 24;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("missing configuration value '{key}' (set it in the config file, via {env} or on the command line)")]
    MissingValue { key: String, env: &'static str },
}

/// Settings for `ha-inspect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectConfig {
    /// Snapshot document to analyze
    pub snapshot: Option<PathBuf>,

    /// Per-request deadline
    pub request_timeout_secs: u64,

    /// Hours of history fetched by `analyze --history`
    pub history_hours: u32,

    /// Maximum history entries reported
    pub history_limit: usize,

    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            request_timeout_secs: 30,
            history_hours: 24,
            history_limit: 20,
            log_level: "info".to_string(),
        }
    }
}

impl InspectConfig {
    /// Load from `path` if given, otherwise start from defaults, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file is an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from an environment-style lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(snapshot) = lookup(ENV_SNAPSHOT).filter(|s| !s.is_empty()) {
            self.snapshot = Some(PathBuf::from(snapshot));
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs =
                timeout
                    .trim()
                    .parse()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS.to_string(),
                        reason: format!("{err}"),
                    })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.snapshot.is_none() {
            return Err(ConfigError::MissingValue {
                key: "snapshot".to_string(),
                env: ENV_SNAPSHOT,
            });
        }

        let positive = [
            ("request_timeout_secs", self.request_timeout_secs == 0),
            ("history_hours", self.history_hours == 0),
            ("history_limit", self.history_limit == 0),
        ];
        for (key, is_zero) in positive {
            if is_zero {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        let bounded = [
            ("request_timeout_secs", self.request_timeout_secs, MAX_REQUEST_TIMEOUT_SECS),
            ("history_hours", u64::from(self.history_hours), u64::from(MAX_HISTORY_HOURS)),
        ];
        for (key, value, max) in bounded {
            if value > max {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("must be at most {max}"),
                });
            }
        }

        Ok(())
    }

    pub fn snapshot_path(&self) -> ConfigResult<&Path> {
        self.snapshot.as_deref().ok_or_else(|| ConfigError::MissingValue {
            key: "snapshot".to_string(),
            env: ENV_SNAPSHOT,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            history_window: chrono::Duration::hours(i64::from(self.history_hours)),
            history_limit: self.history_limit,
        }
    }
}
