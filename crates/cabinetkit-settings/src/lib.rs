//! CabinetKit Settings Crate
//!
//! Handles the configuration file that tunes the snapshot engine:
//! checkpoint capacities and decay windows, catalog prefetch limits,
//! and logging defaults.

pub mod config;
pub mod error;

pub use config::{
    CatalogSettings, Config, HistorySettings, LogFormat, LoggingSettings, MAX_HISTORY_SECS,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
