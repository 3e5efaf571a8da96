//! # CabinetKit Core
//!
//! Core types, errors, and utilities shared by the CabinetKit crates.
//! Provides the error taxonomy, the notice/event bus used to surface
//! history and restore outcomes to the UI, and shared-state aliases.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{CatalogError, DocumentError, HistoryError};

pub use event_bus::{
    AppEvent, CatalogEvent, EventBus, EventCategory, EventFilter, HistoryEvent, Notice,
    NoticeLevel, RestoreEvent,
};

pub use types::{
    thread_safe, thread_safe_rw, thread_safe_rw_map, ThreadSafe, ThreadSafeRw, ThreadSafeRwMap,
};
