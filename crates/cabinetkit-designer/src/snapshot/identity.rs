//! Document-to-live identity mapping.

use std::collections::HashMap;

use crate::model::{CabinetId, ParentRole, ViewId};

/// Old (document) to new (live) identities minted during one restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    cabinets: HashMap<CabinetId, CabinetId>,
    views: HashMap<ViewId, ViewId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_cabinet(&mut self, old: CabinetId, new: CabinetId) {
        self.cabinets.insert(old, new);
    }

    pub fn cabinet(&self, old: &CabinetId) -> Option<&CabinetId> {
        self.cabinets.get(old)
    }

    pub fn insert_view(&mut self, old: ViewId, new: ViewId) {
        self.views.insert(old, new);
    }

    pub fn view(&self, old: &ViewId) -> Option<&ViewId> {
        self.views.get(old)
    }

    pub fn cabinet_count(&self) -> usize {
        self.cabinets.len()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Map a list of old identities, dropping those with no live counterpart.
    /// Returns the mapped list and the number dropped.
    pub fn remap_all<'a, I>(&self, old: I) -> (Vec<CabinetId>, usize)
    where
        I: IntoIterator<Item = &'a CabinetId>,
    {
        let mut dropped = 0;
        let mapped = old
            .into_iter()
            .filter_map(|id| {
                let new = self.cabinet(id).cloned();
                if new.is_none() {
                    dropped += 1;
                }
                new
            })
            .collect();
        (mapped, dropped)
    }
}

/// A parent relationship waiting for the relational pass.
///
/// Both ends carry document identities; the edge is resolved once every
/// cabinet has been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdge {
    pub child: CabinetId,
    pub role: ParentRole,
    pub target: CabinetId,
}

impl PendingEdge {
    /// Live `(child, target)` pair, or `None` if either end is missing.
    pub fn resolve(&self, map: &IdentityMap) -> Option<(CabinetId, CabinetId)> {
        let child = map.cabinet(&self.child)?;
        let target = map.cabinet(&self.target)?;
        Some((child.clone(), target.clone()))
    }
}
