//! Checkpoint history.
//!
//! Two sequences of room documents: `past` (oldest first, the last entry is
//! the most recently visited) and `future` (entries that were undone, the
//! next redo first). The live scene itself is in neither list.
//!
//! Manual checkpoints are kept until the capacity cap pushes them out. Auto
//! checkpoints decay: all are kept for the dense window, then one per
//! wall-clock bucket until the sparse window, then none.
//!
//! Every operation that restores goes through the restorer's in-progress
//! guard, so overlapping undo/redo/jump/load calls collapse to one restore
//! and the extra calls return `false` without touching history.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use cabinetkit_core::{AppEvent, EventBus, HistoryError, HistoryEvent, Notice};
use cabinetkit_settings::HistorySettings;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::serialization::RoomDocument;
use crate::snapshot::{DocumentStamp, RestoreError, RestoreGuard, RestoreReport, SnapshotRestorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointKind {
    Manual,
    Auto,
}

impl std::fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointKind::Manual => write!(f, "manual"),
            CheckpointKind::Auto => write!(f, "auto"),
        }
    }
}

/// A room document tagged with how it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(flatten)]
    pub document: RoomDocument,
    #[serde(rename = "type")]
    pub kind: CheckpointKind,
}

impl Checkpoint {
    pub fn manual(document: RoomDocument) -> Self {
        Self {
            document,
            kind: CheckpointKind::Manual,
        }
    }

    pub fn auto(document: RoomDocument) -> Self {
        Self {
            document,
            kind: CheckpointKind::Auto,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.kind == CheckpointKind::Manual
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.document.saved_at
    }
}

/// Capacity, cadence and decay settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    pub max_checkpoints: usize,
    pub max_checkpoints_with_auto: usize,
    pub auto_enabled: bool,
    pub auto_interval: StdDuration,
    pub dense_window: Duration,
    pub sparse_window: Duration,
    pub sparse_bucket: Duration,
}

impl HistoryConfig {
    pub fn capacity(&self) -> usize {
        if self.auto_enabled {
            self.max_checkpoints_with_auto
        } else {
            self.max_checkpoints
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::from(&HistorySettings::default())
    }
}

impl From<&HistorySettings> for HistoryConfig {
    fn from(settings: &HistorySettings) -> Self {
        Self {
            max_checkpoints: settings.max_checkpoints.max(1),
            max_checkpoints_with_auto: settings.max_checkpoints_with_auto.max(1),
            auto_enabled: settings.auto_checkpoint_enabled,
            auto_interval: StdDuration::from_secs(settings.auto_interval_secs.max(1)),
            dense_window: secs(settings.dense_window_secs),
            sparse_window: secs(settings.sparse_window_secs),
            sparse_bucket: secs(settings.sparse_bucket_secs.max(1)),
        }
    }
}

fn secs(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// What one auto-checkpoint tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTickOutcome {
    /// A checkpoint was appended; `pruned` older ones were removed.
    Recorded { pruned: usize },
    /// The scene matches the last recorded content.
    Unchanged,
    /// A restore is in flight.
    Restoring,
    /// Auto-checkpointing is turned off.
    Disabled,
}

/// One row of the history list shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointSummary {
    /// Index into the combined past/future sequence.
    pub index: usize,
    pub kind: CheckpointKind,
    pub saved_at: DateTime<Utc>,
    pub cabinet_count: usize,
    /// False for entries that were undone.
    pub in_past: bool,
}

#[derive(Debug, Default)]
struct HistoryState {
    past: Vec<Checkpoint>,
    future: Vec<Checkpoint>,
    last_content: Option<String>,
}

impl HistoryState {
    fn len(&self) -> usize {
        self.past.len() + self.future.len()
    }
}

pub struct CheckpointHistory {
    restorer: Arc<SnapshotRestorer>,
    clock: Arc<dyn Clock>,
    config: Mutex<HistoryConfig>,
    state: Mutex<HistoryState>,
    events: Arc<EventBus>,
}

impl CheckpointHistory {
    pub fn new(
        restorer: Arc<SnapshotRestorer>,
        clock: Arc<dyn Clock>,
        config: HistoryConfig,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            restorer,
            clock,
            config: Mutex::new(config),
            state: Mutex::new(HistoryState::default()),
            events,
        }
    }

    pub fn restorer(&self) -> &Arc<SnapshotRestorer> {
        &self.restorer
    }

    pub fn config(&self) -> HistoryConfig {
        self.config.lock().clone()
    }

    /// Turn auto-checkpointing on or off. Switches the capacity in effect;
    /// the past is trimmed if it is now over the cap.
    pub fn set_auto_checkpointing(&self, enabled: bool) {
        let capacity = {
            let mut config = self.config.lock();
            config.auto_enabled = enabled;
            config.capacity()
        };
        let removed = enforce_capacity(&mut self.state.lock().past, capacity);
        self.emit_pruned(removed);
    }

    /// Serialize the live scene stamped with the current clock.
    pub fn capture(&self) -> RoomDocument {
        self.restorer
            .capture(DocumentStamp::at(self.clock.now()))
    }

    /// Record a manual checkpoint of the live scene.
    ///
    /// Clears the redo branch. Returns false while a restore is running.
    pub fn create_checkpoint(&self) -> bool {
        if self.restorer.is_restoring() {
            tracing::debug!("Checkpoint skipped: restore in progress");
            return false;
        }

        let document = self.capture();
        let content = content_key(&document);
        let saved_at = document.saved_at;
        let capacity = self.config.lock().capacity();

        let (past_len, pruned) = {
            let mut state = self.state.lock();
            state.past.push(Checkpoint::manual(document));
            state.future.clear();
            state.last_content = content;
            let pruned = enforce_capacity(&mut state.past, capacity);
            (state.past.len(), pruned)
        };

        tracing::info!("Manual checkpoint created ({} in history)", past_len);
        self.events.emit(AppEvent::History(HistoryEvent::CheckpointCreated {
            manual: true,
            saved_at,
            past_len,
        }));
        self.emit_pruned(pruned);
        true
    }

    /// One auto-checkpoint timer tick.
    pub fn auto_checkpoint_tick(&self) -> AutoTickOutcome {
        let config = self.config();
        if !config.auto_enabled {
            return AutoTickOutcome::Disabled;
        }
        if self.restorer.is_restoring() {
            return AutoTickOutcome::Restoring;
        }

        let document = self.capture();
        let content = content_key(&document);
        let now = document.saved_at;

        let (past_len, pruned) = {
            let mut state = self.state.lock();
            if content.is_some() && state.last_content == content {
                return AutoTickOutcome::Unchanged;
            }
            state.past.push(Checkpoint::auto(document));
            state.future.clear();
            state.last_content = content;
            let mut pruned = prune_decayed(&mut state.past, now, &config);
            pruned += enforce_capacity(&mut state.past, config.capacity());
            (state.past.len(), pruned)
        };

        tracing::debug!(
            "Auto checkpoint created ({} in history, {} pruned)",
            past_len,
            pruned
        );
        self.events.emit(AppEvent::History(HistoryEvent::CheckpointCreated {
            manual: false,
            saved_at: now,
            past_len,
        }));
        self.emit_pruned(pruned);
        AutoTickOutcome::Recorded { pruned }
    }

    /// Move the last past entry to the front of the future and restore it.
    pub async fn undo(&self) -> bool {
        let Some(guard) = self.restorer.try_begin() else {
            tracing::debug!("Undo ignored: restore in progress");
            return false;
        };

        let checkpoint = {
            let mut state = self.state.lock();
            let Some(checkpoint) = state.past.pop() else {
                return false;
            };
            state.future.insert(0, checkpoint.clone());
            checkpoint
        };

        self.restore_checkpoint(&guard, &checkpoint, "undo").await
    }

    /// Move the first future entry to the end of the past and restore it.
    pub async fn redo(&self) -> bool {
        let Some(guard) = self.restorer.try_begin() else {
            tracing::debug!("Redo ignored: restore in progress");
            return false;
        };

        let checkpoint = {
            let mut state = self.state.lock();
            if state.future.is_empty() {
                return false;
            }
            let checkpoint = state.future.remove(0);
            state.past.push(checkpoint.clone());
            checkpoint
        };

        self.restore_checkpoint(&guard, &checkpoint, "redo").await
    }

    /// Split `[past.., future..]` after `index` and restore that entry.
    ///
    /// `Ok(false)` means a restore was already running and nothing changed.
    pub async fn jump_to(&self, index: usize) -> Result<bool, HistoryError> {
        let Some(guard) = self.restorer.try_begin() else {
            tracing::debug!("Jump ignored: restore in progress");
            return Ok(false);
        };

        let checkpoint = {
            let mut state = self.state.lock();
            let len = state.len();
            if index >= len {
                return Err(HistoryError::IndexOutOfRange { index, len });
            }
            let mut combined = std::mem::take(&mut state.past);
            combined.append(&mut state.future);
            state.future = combined.split_off(index + 1);
            state.past = combined;
            state.past[index].clone()
        };

        Ok(self.restore_checkpoint(&guard, &checkpoint, "jump").await)
    }

    /// Remove an entry from the combined sequence without restoring anything.
    pub fn delete_checkpoint(&self, index: usize) -> Result<Checkpoint, HistoryError> {
        let removed = {
            let mut state = self.state.lock();
            let len = state.len();
            let past_len = state.past.len();
            if index < past_len {
                state.past.remove(index)
            } else if index < len {
                state.future.remove(index - past_len)
            } else {
                return Err(HistoryError::IndexOutOfRange { index, len });
            }
        };

        self.events
            .emit(AppEvent::History(HistoryEvent::CheckpointDeleted { index }));
        Ok(removed)
    }

    /// Clear both sequences and seed the past with one manual checkpoint,
    /// either `initial` or a capture of the live scene.
    ///
    /// Returns false while a restore is running.
    pub fn reset_history(&self, initial: Option<RoomDocument>) -> bool {
        if self.restorer.is_restoring() {
            tracing::debug!("History reset skipped: restore in progress");
            return false;
        }

        self.seed(initial.unwrap_or_else(|| self.capture()));
        true
    }

    /// Restore a different room and start a fresh history from it.
    ///
    /// Returns `Ok(None)` without touching the scene while another restore
    /// is running.
    pub async fn load_room(
        &self,
        document: &RoomDocument,
    ) -> Result<Option<RestoreReport>, RestoreError> {
        let Some(guard) = self.restorer.try_begin() else {
            tracing::debug!("Load of '{}' ignored: restore in progress", document.name);
            return Ok(None);
        };

        let report = self.restorer.restore_guarded(&guard, document).await?;
        self.seed(self.capture());
        self.events.emit(AppEvent::Notice(Notice::info(format!(
            "Loaded room '{}'",
            document.name
        ))));
        Ok(Some(report))
    }

    fn seed(&self, document: RoomDocument) {
        {
            let mut state = self.state.lock();
            state.future.clear();
            state.past.clear();
            state.last_content = content_key(&document);
            state.past.push(Checkpoint::manual(document));
        }

        tracing::info!("History reset");
        self.events.emit(AppEvent::History(HistoryEvent::HistoryReset));
    }

    /// Drive auto-checkpoint ticks until `shutdown` turns true or its sender
    /// goes away.
    pub async fn run_auto_checkpoints(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config().auto_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the initial
        // checkpoint comes one interval after start.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.auto_checkpoint_tick() {
                        AutoTickOutcome::Recorded { pruned } => {
                            tracing::trace!("Auto checkpoint tick recorded, {} pruned", pruned);
                        }
                        AutoTickOutcome::Unchanged => tracing::trace!("Auto checkpoint skipped: no changes"),
                        AutoTickOutcome::Restoring => tracing::trace!("Auto checkpoint skipped: restoring"),
                        AutoTickOutcome::Disabled => {}
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Auto checkpoint loop stopped");
                        break;
                    }
                }
            }
        }
    }

    pub fn past_len(&self) -> usize {
        self.state.lock().past.len()
    }

    pub fn future_len(&self) -> usize {
        self.state.lock().future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.is_restoring() && self.past_len() > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.is_restoring() && self.future_len() > 0
    }

    pub fn is_restoring(&self) -> bool {
        self.restorer.is_restoring()
    }

    /// Entry at a combined index.
    pub fn checkpoint(&self, index: usize) -> Option<Checkpoint> {
        let state = self.state.lock();
        state
            .past
            .iter()
            .chain(state.future.iter())
            .nth(index)
            .cloned()
    }

    pub fn checkpoints(&self) -> Vec<CheckpointSummary> {
        let state = self.state.lock();
        let past_len = state.past.len();
        state
            .past
            .iter()
            .chain(state.future.iter())
            .enumerate()
            .map(|(index, checkpoint)| CheckpointSummary {
                index,
                kind: checkpoint.kind,
                saved_at: checkpoint.saved_at(),
                cabinet_count: checkpoint.document.cabinets.len(),
                in_past: index < past_len,
            })
            .collect()
    }

    async fn restore_checkpoint(
        &self,
        guard: &RestoreGuard<'_>,
        checkpoint: &Checkpoint,
        action: &str,
    ) -> bool {
        match self
            .restorer
            .restore_guarded(guard, &checkpoint.document)
            .await
        {
            Ok(_) => {
                let live = self
                    .restorer
                    .capture(DocumentStamp::at(self.clock.now()));
                let (past_len, future_len) = {
                    let mut state = self.state.lock();
                    state.last_content = content_key(&live);
                    (state.past.len(), state.future.len())
                };
                tracing::info!(
                    "{} restored checkpoint from {} ({} / {})",
                    action,
                    checkpoint.saved_at(),
                    past_len,
                    past_len + future_len
                );
                self.events.emit(AppEvent::History(HistoryEvent::CursorMoved {
                    past_len,
                    future_len,
                }));
                true
            }
            Err(err) => {
                tracing::error!("{} failed to restore checkpoint: {}", action, err);
                false
            }
        }
    }

    fn emit_pruned(&self, removed: usize) {
        if removed > 0 {
            self.events
                .emit(AppEvent::History(HistoryEvent::CheckpointsPruned { removed }));
        }
    }
}

impl std::fmt::Debug for CheckpointHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CheckpointHistory")
            .field("past", &state.past.len())
            .field("future", &state.future.len())
            .finish()
    }
}

fn content_key(document: &RoomDocument) -> Option<String> {
    match document.content_key() {
        Ok(key) => Some(key),
        Err(err) => {
            tracing::warn!("Could not compute checkpoint content key: {}", err);
            None
        }
    }
}

/// Drop the oldest entries until `past` fits. Returns how many were dropped.
fn enforce_capacity(past: &mut Vec<Checkpoint>, capacity: usize) -> usize {
    let excess = past.len().saturating_sub(capacity);
    past.drain(..excess);
    excess
}

/// Apply the age-decay policy to auto checkpoints. Manual ones are untouched.
fn prune_decayed(past: &mut Vec<Checkpoint>, now: DateTime<Utc>, config: &HistoryConfig) -> usize {
    let bucket_secs = config.sparse_bucket.num_seconds().max(1);
    let mut seen_buckets = HashSet::new();
    let mut keep = vec![true; past.len()];

    // Newest first, so each bucket keeps its most recent checkpoint.
    for (i, checkpoint) in past.iter().enumerate().rev() {
        if checkpoint.is_manual() {
            continue;
        }
        let age = now - checkpoint.saved_at();
        if age < config.dense_window {
            continue;
        }
        if age > config.sparse_window {
            keep[i] = false;
            continue;
        }
        let bucket = checkpoint.saved_at().timestamp().div_euclid(bucket_secs);
        if !seen_buckets.insert(bucket) {
            keep[i] = false;
        }
    }

    let before = past.len();
    let kept: Vec<Checkpoint> = std::mem::take(past)
        .into_iter()
        .zip(keep)
        .filter_map(|(checkpoint, keep)| keep.then_some(checkpoint))
        .collect();
    *past = kept;
    before - past.len()
}
