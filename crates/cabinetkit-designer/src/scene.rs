//! Live scene: cabinets, walls, views, proportional groups and syncs.

use std::collections::BTreeMap;

use crate::model::{
    Cabinet, CabinetId, CameraState, GroupMember, ViewManager, WallSettings,
};

/// Room metadata carried into documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    pub category: Option<String>,
}

impl Default for RoomInfo {
    fn default() -> Self {
        Self {
            name: "Untitled Room".to_string(),
            category: None,
        }
    }
}

/// Mutable scene graph the designer edits.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub room: RoomInfo,
    pub cabinets: Vec<Cabinet>,
    pub walls: WallSettings,
    pub camera: CameraState,
    pub views: ViewManager,
    /// Proportional-resize groups keyed by owning cabinet.
    pub groups: BTreeMap<CabinetId, Vec<GroupMember>>,
    /// Cabinets whose dimensions follow the key cabinet.
    pub syncs: BTreeMap<CabinetId, Vec<CabinetId>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cabinet(&mut self, cabinet: Cabinet) -> CabinetId {
        let id = cabinet.id.clone();
        self.cabinets.push(cabinet);
        id
    }

    pub fn cabinet(&self, id: &CabinetId) -> Option<&Cabinet> {
        self.cabinets.iter().find(|c| &c.id == id)
    }

    pub fn cabinet_mut(&mut self, id: &CabinetId) -> Option<&mut Cabinet> {
        self.cabinets.iter_mut().find(|c| &c.id == id)
    }

    /// Remove a cabinet and every reference to it held by the scene.
    pub fn remove_cabinet(&mut self, id: &CabinetId) -> Option<Cabinet> {
        let index = self.cabinets.iter().position(|c| &c.id == id)?;
        let removed = self.cabinets.remove(index);

        self.views.unassign_cabinet(id);
        self.groups.remove(id);
        self.syncs.remove(id);
        for members in self.groups.values_mut() {
            members.retain(|m| &m.cabinet_id != id);
        }
        for synced in self.syncs.values_mut() {
            synced.retain(|s| s != id);
        }
        self.groups.retain(|_, members| !members.is_empty());
        self.syncs.retain(|_, synced| !synced.is_empty());
        for cabinet in &mut self.cabinets {
            cabinet.relations.detach(id);
        }

        Some(removed)
    }

    /// Drop all cabinets along with their groups and syncs.
    pub fn clear_cabinets(&mut self) {
        self.cabinets.clear();
        self.groups.clear();
        self.syncs.clear();
    }

    /// Replace the wall settings. The camera is left where it is.
    pub fn apply_wall_settings(&mut self, walls: WallSettings) {
        self.walls = walls;
    }

    /// Set the group owned by `owner`; an empty list removes it.
    pub fn set_group(&mut self, owner: CabinetId, members: Vec<GroupMember>) {
        if members.is_empty() {
            self.groups.remove(&owner);
        } else {
            self.groups.insert(owner, members);
        }
    }

    /// Set the cabinets synced to `source`; an empty list removes it.
    pub fn set_sync(&mut self, source: CabinetId, synced: Vec<CabinetId>) {
        if synced.is_empty() {
            self.syncs.remove(&source);
        } else {
            self.syncs.insert(source, synced);
        }
    }

    pub fn group(&self, owner: &CabinetId) -> &[GroupMember] {
        self.groups.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn synced(&self, source: &CabinetId) -> &[CabinetId] {
        self.syncs.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cabinet_count(&self) -> usize {
        self.cabinets.len()
    }
}
