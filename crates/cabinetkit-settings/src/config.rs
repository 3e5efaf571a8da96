//! Configuration for the CabinetKit snapshot engine
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into sections:
//! - History (checkpoint capacity, auto-checkpoint cadence, decay windows)
//! - Catalog (product prefetch batching)
//! - Logging (default level and output format)

use crate::error::{ConfigError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound accepted for any history interval or window, in seconds (one year)
pub const MAX_HISTORY_SECS: u64 = 365 * 24 * 60 * 60;

/// Checkpoint history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Past capacity when only manual checkpoints are taken
    pub max_checkpoints: usize,
    /// Past capacity when auto-checkpointing is enabled
    pub max_checkpoints_with_auto: usize,
    /// Whether the auto-checkpoint timer runs
    pub auto_checkpoint_enabled: bool,
    /// Seconds between auto-checkpoint ticks
    pub auto_interval_secs: u64,
    /// Auto checkpoints younger than this are always kept
    pub dense_window_secs: u64,
    /// Auto checkpoints older than this are always dropped
    pub sparse_window_secs: u64,
    /// Width of the buckets thinning the sparse band (one kept per bucket)
    pub sparse_bucket_secs: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_checkpoints: 20,
            max_checkpoints_with_auto: 50,
            auto_checkpoint_enabled: true,
            auto_interval_secs: 5,
            dense_window_secs: 60,
            sparse_window_secs: 20 * 60,
            sparse_bucket_secs: 60,
        }
    }
}

/// Product catalog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Maximum number of product fetches in flight during a prefetch
    pub max_concurrent_fetches: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level directive, overridden by `RUST_LOG`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Checkpoint history settings
    pub history: HistorySettings,
    /// Product catalog settings
    pub catalog: CatalogSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/cabinetkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dir.join("cabinetkit").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Self::format_of(path)? {
            "json" => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or return defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format_of(path)? {
            "json" => serde_json::to_string_pretty(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn format_of(path: &Path) -> Result<&'static str, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok("json"),
            Some("toml") => Ok("toml"),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let history = &self.history;

        if history.max_checkpoints == 0 {
            return Err(out_of_range("history.max_checkpoints", history.max_checkpoints));
        }
        if history.max_checkpoints_with_auto == 0 {
            return Err(out_of_range(
                "history.max_checkpoints_with_auto",
                history.max_checkpoints_with_auto,
            ));
        }
        if history.auto_interval_secs == 0 {
            return Err(out_of_range(
                "history.auto_interval_secs",
                history.auto_interval_secs,
            ));
        }
        for (key, value) in [
            ("history.auto_interval_secs", history.auto_interval_secs),
            ("history.dense_window_secs", history.dense_window_secs),
            ("history.sparse_window_secs", history.sparse_window_secs),
            ("history.sparse_bucket_secs", history.sparse_bucket_secs),
        ] {
            if value > MAX_HISTORY_SECS {
                return Err(out_of_range(key, value));
            }
        }
        if history.sparse_window_secs < history.dense_window_secs {
            return Err(out_of_range(
                "history.sparse_window_secs",
                history.sparse_window_secs,
            ));
        }
        if history.sparse_bucket_secs == 0 {
            return Err(out_of_range(
                "history.sparse_bucket_secs",
                history.sparse_bucket_secs,
            ));
        }

        if self.catalog.max_concurrent_fetches == 0 {
            return Err(out_of_range(
                "catalog.max_concurrent_fetches",
                self.catalog.max_concurrent_fetches,
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValueOutOfRange {
                key: "logging.level".to_string(),
                value: String::new(),
            });
        }

        Ok(())
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
