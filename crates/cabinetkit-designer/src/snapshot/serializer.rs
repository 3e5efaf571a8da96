//! Scene to room document.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::Cabinet;
use crate::panel_state::PanelStateStore;
use crate::scene::Scene;
use crate::serialization::{
    CabinetSyncRecord, RoomDocument, SavedCabinet, SavedView, ROOM_FORMAT_VERSION,
};

/// Identity and timestamp given to a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStamp {
    pub id: String,
    pub saved_at: DateTime<Utc>,
}

impl DocumentStamp {
    pub fn new(id: impl Into<String>, saved_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            saved_at,
        }
    }

    /// Fresh random id stamped at `saved_at`.
    pub fn at(saved_at: DateTime<Utc>) -> Self {
        Self::new(Uuid::new_v4().to_string(), saved_at)
    }
}

/// Capture the scene as a room document.
///
/// Reads only; the output depends on nothing but the arguments. Panel-state
/// fields are looked up by each cabinet's current identity. Structural
/// fields always come from the live cabinet.
pub fn serialize(scene: &Scene, panel_state: &PanelStateStore, stamp: DocumentStamp) -> RoomDocument {
    let cabinets = scene
        .cabinets
        .iter()
        .map(|cabinet| save_cabinet(scene, panel_state, cabinet))
        .collect();

    let views = scene
        .views
        .views()
        .iter()
        .map(|view| SavedView {
            id: view.id.clone(),
            name: view.name.clone(),
            cabinet_ids: view.cabinet_ids.clone(),
        })
        .collect();

    let cabinet_syncs = scene
        .cabinets
        .iter()
        .filter_map(|cabinet| {
            let synced = scene.synced(&cabinet.id);
            (!synced.is_empty()).then(|| CabinetSyncRecord {
                cabinet_id: cabinet.id.clone(),
                synced_cabinet_ids: synced.to_vec(),
            })
        })
        .collect();

    RoomDocument {
        version: ROOM_FORMAT_VERSION.to_string(),
        id: stamp.id,
        name: scene.room.name.clone(),
        category: scene.room.category.clone(),
        saved_at: stamp.saved_at,
        wall_settings: scene.walls.clone(),
        cabinets,
        views,
        cabinet_syncs,
    }
}

fn save_cabinet(scene: &Scene, panel_state: &PanelStateStore, cabinet: &Cabinet) -> SavedCabinet {
    let panel = panel_state.get(&cabinet.id).unwrap_or_default();
    let view_id = scene
        .views
        .cabinet_view(&cabinet.id)
        .cloned()
        .or_else(|| cabinet.view_id.clone());

    SavedCabinet {
        cabinet_id: cabinet.id.clone(),
        product: cabinet.product.clone(),
        subcategory_id: cabinet.subcategory_id.clone(),
        cabinet_type: cabinet.cabinet_type,
        dimensions: cabinet.dimensions,
        position: cabinet.position,
        view_id,
        dimension_values: panel.dimension_values,
        material_selections: panel.material_selections,
        material_color: panel.material_color,
        config: cabinet.config.clone(),
        locks: cabinet.locks,
        group: scene.group(&cabinet.id).to_vec(),
        sort_number: cabinet.sort_number,
        relations: cabinet.relations.clone(),
    }
}
