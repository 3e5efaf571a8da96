//! Designer state: the live scene plus everything that snapshots it.

mod file_io;

use std::path::PathBuf;
use std::sync::Arc;

use cabinetkit_core::{thread_safe_rw, EventBus, ThreadSafeRw};
use cabinetkit_settings::Config;

use crate::catalog::{ProductCatalog, ProductSource};
use crate::clock::{Clock, SystemClock};
use crate::factory::{CabinetFactory, CatalogCabinetFactory};
use crate::history::{CheckpointHistory, HistoryConfig};
use crate::model::WallSettings;
use crate::panel_state::PanelStateStore;
use crate::scene::{RoomInfo, Scene};
use crate::serialization::RoomDocument;
use crate::snapshot::SnapshotRestorer;

pub struct DesignerState {
    pub scene: ThreadSafeRw<Scene>,
    pub panel_state: Arc<PanelStateStore>,
    pub catalog: Arc<ProductCatalog>,
    pub events: Arc<EventBus>,
    pub restorer: Arc<SnapshotRestorer>,
    pub history: Arc<CheckpointHistory>,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
}

impl DesignerState {
    /// Creates a designer using the system clock and the catalog-backed factory.
    pub fn new(config: &Config, source: Arc<dyn ProductSource>) -> Self {
        Self::with_parts(
            config,
            source,
            Arc::new(SystemClock),
            |catalog| -> Arc<dyn CabinetFactory> { Arc::new(CatalogCabinetFactory::new(catalog)) },
        )
    }

    /// Creates a designer with a custom clock and factory.
    pub fn with_parts<F>(
        config: &Config,
        source: Arc<dyn ProductSource>,
        clock: Arc<dyn Clock>,
        make_factory: F,
    ) -> Self
    where
        F: FnOnce(Arc<ProductCatalog>) -> Arc<dyn CabinetFactory>,
    {
        let events = Arc::new(EventBus::new());
        let scene = thread_safe_rw(Scene::new());
        let panel_state = Arc::new(PanelStateStore::new());
        let catalog = Arc::new(ProductCatalog::new(
            source,
            config.catalog.max_concurrent_fetches,
            events.clone(),
        ));
        let factory = make_factory(catalog.clone());
        let restorer = Arc::new(SnapshotRestorer::new(
            scene.clone(),
            panel_state.clone(),
            catalog.clone(),
            factory,
            events.clone(),
        ));
        let history = Arc::new(CheckpointHistory::new(
            restorer.clone(),
            clock,
            HistoryConfig::from(&config.history),
            events.clone(),
        ));

        Self {
            scene,
            panel_state,
            catalog,
            events,
            restorer,
            history,
            current_file_path: None,
            is_modified: false,
        }
    }

    /// Capture the current scene.
    pub fn snapshot(&self) -> RoomDocument {
        self.history.capture()
    }

    pub fn mark_modified(&mut self) {
        self.is_modified = true;
    }

    /// Start an empty room and seed history with it.
    pub fn new_design(&mut self, name: impl Into<String>) {
        {
            let mut scene = self.scene.write();
            scene.clear_cabinets();
            scene.views.clear();
            scene.room = RoomInfo {
                name: name.into(),
                category: None,
            };
            scene.apply_wall_settings(WallSettings::default());
        }
        self.panel_state.clear();
        self.history.reset_history(None);
        self.current_file_path = None;
        self.is_modified = false;
    }

    /// Name for title bars: the file stem when saved, otherwise the room name.
    pub fn display_name(&self) -> String {
        self.current_file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.scene.read().room.name.clone())
    }
}

impl std::fmt::Debug for DesignerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignerState")
            .field("cabinets", &self.scene.read().cabinet_count())
            .field("history", &self.history)
            .field("current_file_path", &self.current_file_path)
            .field("is_modified", &self.is_modified)
            .finish()
    }
}
