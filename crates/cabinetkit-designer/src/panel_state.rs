//! Panel State Store.
//!
//! Holds the last user-edited dimension values, material selections,
//! material color and price per cabinet. The store is shared by `Arc`
//! between the serializer, the restorer and the edit panels.

use std::collections::BTreeMap;

use cabinetkit_core::{thread_safe_rw_map, ThreadSafeRwMap};
use serde::{Deserialize, Serialize};

use crate::model::CabinetId;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_values: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_selections: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl PanelState {
    /// True when nothing would be written to a document.
    pub fn is_empty(&self) -> bool {
        self.dimension_values.is_none()
            && self.material_selections.is_none()
            && self.material_color.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct PanelStateStore {
    states: ThreadSafeRwMap<CabinetId, PanelState>,
}

impl PanelStateStore {
    pub fn new() -> Self {
        Self {
            states: thread_safe_rw_map(),
        }
    }

    pub fn get(&self, id: &CabinetId) -> Option<PanelState> {
        self.states.read().get(id).cloned()
    }

    pub fn set(&self, id: CabinetId, state: PanelState) {
        self.states.write().insert(id, state);
    }

    /// Edit the state for `id` in place, creating an empty one first if needed.
    pub fn update<F>(&self, id: &CabinetId, f: F)
    where
        F: FnOnce(&mut PanelState),
    {
        let mut states = self.states.write();
        f(states.entry(id.clone()).or_default());
    }

    pub fn remove(&self, id: &CabinetId) -> Option<PanelState> {
        self.states.write().remove(id)
    }

    pub fn clear(&self) {
        self.states.write().clear();
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }
}

impl Default for PanelStateStore {
    fn default() -> Self {
        Self::new()
    }
}
