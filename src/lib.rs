//! # CabinetKit
//!
//! Scene snapshot and checkpoint history engine for a kitchen cabinet
//! configurator.
//!
//! ## Crates
//!
//! - `cabinetkit-core`: error taxonomy, event bus, shared-state aliases
//! - `cabinetkit-settings`: history, catalog and logging configuration
//! - `cabinetkit-designer`: scene model, serializer, restorer and history

pub use cabinetkit_core::{
    AppEvent, CatalogError, DocumentError, EventBus, EventCategory, EventFilter, HistoryError,
    HistoryEvent, Notice, NoticeLevel, RestoreEvent,
};
pub use cabinetkit_designer::{
    AutoTickOutcome, CabinetFactory, CheckpointHistory, CheckpointKind, DesignerState,
    DirectoryProductSource, InMemoryProductSource, ProductCatalog, ProductSchema, ProductSource, RestoreError,
    RestoreReport, RoomDocument, Scene, SnapshotRestorer,
};
pub use cabinetkit_settings::{Config, LogFormat, LoggingSettings};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with tracing
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    match settings.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
