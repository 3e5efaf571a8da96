//! Event type definitions for the event bus.
//!
//! Events are organised by category. They are cloneable and serializable so
//! the UI can forward them to toast notifications or write them to a log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Checkpoint history changes
    History(HistoryEvent),
    /// Snapshot restore lifecycle
    Restore(RestoreEvent),
    /// Product catalog loading
    Catalog(CatalogEvent),
    /// User-facing notices (toasts)
    Notice(Notice),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::History(_) => EventCategory::History,
            AppEvent::Restore(_) => EventCategory::Restore,
            AppEvent::Catalog(_) => EventCategory::Catalog,
            AppEvent::Notice(_) => EventCategory::Notice,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::History(e) => e.description(),
            AppEvent::Restore(e) => e.description(),
            AppEvent::Catalog(e) => e.description(),
            AppEvent::Notice(n) => format!("[{}] {}", n.level, n.message),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Checkpoint history events.
    History,
    /// Restore lifecycle events.
    Restore,
    /// Product catalog events.
    Catalog,
    /// User-facing notices.
    Notice,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::History => write!(f, "History"),
            EventCategory::Restore => write!(f, "Restore"),
            EventCategory::Catalog => write!(f, "Catalog"),
            EventCategory::Notice => write!(f, "Notice"),
        }
    }
}

/// Checkpoint history events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// A checkpoint was appended to the past.
    CheckpointCreated {
        /// Whether the checkpoint was taken manually.
        manual: bool,
        /// Creation timestamp of the underlying document.
        saved_at: DateTime<Utc>,
        /// Length of the past after the append.
        past_len: usize,
    },
    /// Auto checkpoints were dropped by the decay policy or the capacity cap.
    CheckpointsPruned {
        /// Number of entries removed.
        removed: usize,
    },
    /// The history cursor moved (undo, redo or jump).
    CursorMoved {
        /// Entries now in the past.
        past_len: usize,
        /// Entries now in the future.
        future_len: usize,
    },
    /// A checkpoint was removed without restoring.
    CheckpointDeleted {
        /// Combined index of the removed checkpoint.
        index: usize,
    },
    /// History was cleared and reseeded.
    HistoryReset,
}

impl HistoryEvent {
    fn description(&self) -> String {
        match self {
            HistoryEvent::CheckpointCreated {
                manual, past_len, ..
            } => format!(
                "{} checkpoint created ({} in history)",
                if *manual { "Manual" } else { "Auto" },
                past_len
            ),
            HistoryEvent::CheckpointsPruned { removed } => {
                format!("Pruned {} checkpoints", removed)
            }
            HistoryEvent::CursorMoved {
                past_len,
                future_len,
            } => format!("History cursor at {} / {}", past_len, past_len + future_len),
            HistoryEvent::CheckpointDeleted { index } => format!("Deleted checkpoint {}", index),
            HistoryEvent::HistoryReset => "History reset".to_string(),
        }
    }
}

/// Restore lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RestoreEvent {
    /// A restore began.
    Started {
        /// Id of the document being restored.
        document_id: String,
        /// Number of cabinets in the document.
        cabinet_count: usize,
    },
    /// A restore ran to completion.
    Completed {
        /// Id of the document restored.
        document_id: String,
        /// Cabinets rebuilt in the live scene.
        restored: usize,
        /// Cabinets the factory could not build.
        skipped: usize,
        /// Relationship, group and sync references that did not resolve.
        dropped_references: usize,
    },
}

impl RestoreEvent {
    fn description(&self) -> String {
        match self {
            RestoreEvent::Started {
                document_id,
                cabinet_count,
            } => format!("Restoring {} ({} cabinets)", document_id, cabinet_count),
            RestoreEvent::Completed {
                document_id,
                restored,
                skipped,
                ..
            } => format!(
                "Restored {}: {} cabinets, {} skipped",
                document_id, restored, skipped
            ),
        }
    }
}

/// Product catalog events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CatalogEvent {
    /// A batched prefetch finished.
    PrefetchCompleted {
        /// Distinct product ids that were not already cached.
        requested: usize,
        /// Product ids fetched successfully.
        loaded: usize,
        /// Product ids whose fetch failed.
        failed: Vec<String>,
    },
}

impl CatalogEvent {
    fn description(&self) -> String {
        match self {
            CatalogEvent::PrefetchCompleted {
                requested,
                loaded,
                failed,
            } => format!(
                "Catalog prefetch: {}/{} loaded, {} failed",
                loaded,
                requested,
                failed.len()
            ),
        }
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something was skipped or degraded.
    Warning,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
        }
    }
}

/// A toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Warning notice
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}
