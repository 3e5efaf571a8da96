//! Views: named subsets of cabinets.
//!
//! A cabinet belongs to at most one view. The manager keeps views in
//! creation order so documents list them deterministically.

use super::ids::{CabinetId, ViewId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub id: ViewId,
    pub name: String,
    pub cabinet_ids: Vec<CabinetId>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewManager {
    views: Vec<View>,
    next_number: usize,
}

impl ViewManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty view with a generated name ("View 1", "View 2", ...).
    pub fn create_view(&mut self) -> ViewId {
        let name = format!("View {}", self.next_number + 1);
        self.create_named_view(name)
    }

    pub fn create_named_view(&mut self, name: impl Into<String>) -> ViewId {
        let id = ViewId::generate();
        self.next_number += 1;
        self.views.push(View {
            id: id.clone(),
            name: name.into(),
            cabinet_ids: Vec::new(),
        });
        id
    }

    pub fn get_view(&self, id: &ViewId) -> Option<&View> {
        self.views.iter().find(|v| &v.id == id)
    }

    pub fn rename_view(&mut self, id: &ViewId, name: impl Into<String>) -> bool {
        match self.views.iter_mut().find(|v| &v.id == id) {
            Some(view) => {
                view.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Move `cabinet` into `view`, removing it from any other view.
    /// Returns false when the view does not exist.
    pub fn assign_cabinet_to_view(&mut self, cabinet: &CabinetId, view: &ViewId) -> bool {
        if self.get_view(view).is_none() {
            return false;
        }
        self.unassign_cabinet(cabinet);
        if let Some(target) = self.views.iter_mut().find(|v| &v.id == view) {
            target.cabinet_ids.push(cabinet.clone());
        }
        true
    }

    pub fn unassign_cabinet(&mut self, cabinet: &CabinetId) {
        for view in &mut self.views {
            view.cabinet_ids.retain(|id| id != cabinet);
        }
    }

    pub fn cabinet_view(&self, cabinet: &CabinetId) -> Option<&ViewId> {
        self.views
            .iter()
            .find(|v| v.cabinet_ids.contains(cabinet))
            .map(|v| &v.id)
    }

    pub fn cabinets_in_view(&self, view: &ViewId) -> &[CabinetId] {
        self.get_view(view)
            .map(|v| v.cabinet_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.views.clear();
        self.next_number = 0;
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
