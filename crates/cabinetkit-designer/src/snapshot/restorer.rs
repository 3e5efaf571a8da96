//! Two-pass snapshot restore.
//!
//! Rebuilds the live scene from a room document:
//!
//! 1. Prefetch every product the document references.
//! 2. Clear the scene, apply walls, then create each cabinet through the
//!    factory with a fresh identity and copy its non-relational fields.
//!    Parent relationships are collected as pending edges.
//! 3. Wait for the factory to settle, then resolve pending edges through
//!    the identity map.
//! 4. Remap groups and syncs, dropping members that did not survive.
//!
//! Only one restore runs at a time. The in-progress flag is also what the
//! checkpoint history checks before capturing the scene.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cabinetkit_core::{AppEvent, DocumentError, EventBus, Notice, RestoreEvent, ThreadSafeRw};
use thiserror::Error;

use super::identity::{IdentityMap, PendingEdge};
use super::serializer::{serialize, DocumentStamp};
use crate::catalog::{PrefetchSummary, ProductCatalog};
use crate::factory::{CabinetFactory, CabinetRequest};
use crate::model::{CabinetId, CabinetType, GroupMember, ViewId, ViewManager};
use crate::panel_state::{PanelState, PanelStateStore};
use crate::scene::{RoomInfo, Scene};
use crate::serialization::{RoomDocument, SavedCabinet};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RestoreError {
    #[error("A restore is already in progress")]
    InProgress,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A document cabinet the factory could not build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCabinet {
    pub cabinet_id: CabinetId,
    pub cabinet_type: CabinetType,
}

/// What a restore did.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub document_id: String,
    pub identity_map: IdentityMap,
    /// Live identities of rebuilt cabinets, in document order.
    pub created: Vec<CabinetId>,
    pub skipped: Vec<SkippedCabinet>,
    /// Parent relationships left unset because an end was missing.
    pub unresolved_relations: usize,
    pub dropped_group_members: usize,
    pub dropped_sync_members: usize,
    pub catalog: PrefetchSummary,
}

impl RestoreReport {
    pub fn dropped_references(&self) -> usize {
        self.unresolved_relations + self.dropped_group_members + self.dropped_sync_members
    }
}

/// Held while a restore runs; clears the in-progress flag on drop.
#[derive(Debug)]
pub struct RestoreGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct CabinetPass {
    map: IdentityMap,
    created: Vec<CabinetId>,
    skipped: Vec<SkippedCabinet>,
    pending: Vec<PendingEdge>,
}

pub struct SnapshotRestorer {
    scene: ThreadSafeRw<Scene>,
    panel_state: Arc<PanelStateStore>,
    catalog: Arc<ProductCatalog>,
    factory: Arc<dyn CabinetFactory>,
    events: Arc<EventBus>,
    in_progress: AtomicBool,
}

impl SnapshotRestorer {
    pub fn new(
        scene: ThreadSafeRw<Scene>,
        panel_state: Arc<PanelStateStore>,
        catalog: Arc<ProductCatalog>,
        factory: Arc<dyn CabinetFactory>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            scene,
            panel_state,
            catalog,
            factory,
            events,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn scene(&self) -> &ThreadSafeRw<Scene> {
        &self.scene
    }

    pub fn panel_state(&self) -> &Arc<PanelStateStore> {
        &self.panel_state
    }

    pub fn catalog(&self) -> &Arc<ProductCatalog> {
        &self.catalog
    }

    pub fn is_restoring(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Claim the in-progress flag, or `None` if a restore already holds it.
    pub fn try_begin(&self) -> Option<RestoreGuard<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RestoreGuard {
                flag: &self.in_progress,
            })
    }

    /// Capture the live scene.
    pub fn capture(&self, stamp: DocumentStamp) -> RoomDocument {
        let scene = self.scene.read();
        serialize(&scene, &self.panel_state, stamp)
    }

    /// Restore `document`, failing with `InProgress` if another restore runs.
    pub async fn restore(&self, document: &RoomDocument) -> Result<RestoreReport, RestoreError> {
        let guard = self.try_begin().ok_or(RestoreError::InProgress)?;
        self.restore_guarded(&guard, document).await
    }

    /// Restore while the caller already holds the in-progress guard.
    pub async fn restore_guarded(
        &self,
        _guard: &RestoreGuard<'_>,
        document: &RoomDocument,
    ) -> Result<RestoreReport, RestoreError> {
        document.validate()?;

        tracing::info!(
            "Restoring room '{}' ({} cabinets)",
            document.name,
            document.cabinets.len()
        );
        self.events.emit(AppEvent::Restore(RestoreEvent::Started {
            document_id: document.id.clone(),
            cabinet_count: document.cabinets.len(),
        }));

        let catalog = self.catalog.prefetch(document.product_ids()).await;

        let pass = self.rebuild_cabinets(document);

        self.factory.settled().await;

        let unresolved_relations = self.link_relations(&pass.map, &pass.pending);
        let (dropped_group_members, dropped_sync_members) =
            self.link_groups_and_syncs(&pass.map, document);

        let report = RestoreReport {
            document_id: document.id.clone(),
            identity_map: pass.map,
            created: pass.created,
            skipped: pass.skipped,
            unresolved_relations,
            dropped_group_members,
            dropped_sync_members,
            catalog,
        };

        tracing::info!(
            "Restored room '{}': {} cabinets, {} skipped, {} dropped references",
            document.name,
            report.created.len(),
            report.skipped.len(),
            report.dropped_references()
        );
        self.publish_outcome(&report);

        Ok(report)
    }

    fn rebuild_cabinets(&self, document: &RoomDocument) -> CabinetPass {
        let mut guard = self.scene.write();
        let scene = &mut *guard;

        for cabinet in &scene.cabinets {
            self.panel_state.remove(&cabinet.id);
        }
        scene.clear_cabinets();
        scene.views.clear();
        scene.room = RoomInfo {
            name: document.name.clone(),
            category: document.category.clone(),
        };
        scene.apply_wall_settings(document.wall_settings.clone());

        let mut pass = CabinetPass {
            map: IdentityMap::new(),
            created: Vec::with_capacity(document.cabinets.len()),
            skipped: Vec::new(),
            pending: Vec::new(),
        };

        // Listed views keep their document order, referenced or not.
        for saved_view in &document.views {
            if pass.map.view(&saved_view.id).is_none() {
                let new_id = scene.views.create_named_view(saved_view.name.clone());
                pass.map.insert_view(saved_view.id.clone(), new_id);
            }
        }

        for saved in &document.cabinets {
            let request = CabinetRequest {
                cabinet_type: saved.cabinet_type,
                subcategory_id: saved.subcategory_id.clone(),
                product: saved.product.clone(),
            };
            let Some(mut cabinet) = self.factory.create_cabinet(&request) else {
                tracing::warn!(
                    "Skipping cabinet {} ({}): factory could not create it",
                    saved.cabinet_id,
                    saved.cabinet_type
                );
                pass.skipped.push(SkippedCabinet {
                    cabinet_id: saved.cabinet_id.clone(),
                    cabinet_type: saved.cabinet_type,
                });
                continue;
            };

            let live_view = saved
                .view_id
                .as_ref()
                .map(|old| resolve_view(&mut scene.views, &mut pass.map, old));

            let defaults = self.factory.default_config(&request);
            cabinet.dimensions = saved.dimensions;
            cabinet.position = saved.position;
            cabinet.subcategory_id = saved.subcategory_id.clone();
            if saved.product.product_id.is_some() || saved.product.product_name.is_some() {
                cabinet.product = saved.product.clone();
            }
            cabinet.config = saved.config.or_defaults(&defaults);
            cabinet.locks = saved.locks;
            cabinet.sort_number = saved.sort_number;
            cabinet.view_id = live_view.clone();
            cabinet.skip_dimension_defaults = true;

            for (role, target) in saved.relations.iter() {
                pass.pending.push(PendingEdge {
                    child: saved.cabinet_id.clone(),
                    role,
                    target: target.clone(),
                });
            }

            let new_id = cabinet.id.clone();
            pass.map
                .insert_cabinet(saved.cabinet_id.clone(), new_id.clone());
            if let Some(view) = &live_view {
                scene.views.assign_cabinet_to_view(&new_id, view);
            }
            if let Some(state) = panel_state_of(saved) {
                self.panel_state.set(new_id.clone(), state);
            }
            scene.add_cabinet(cabinet);
            pass.created.push(new_id);
        }

        for wall in &mut scene.walls.additional_walls {
            if let Some(old) = wall.linked_view_id.take() {
                wall.linked_view_id = pass.map.view(&old).cloned();
                if wall.linked_view_id.is_none() {
                    tracing::debug!("Wall {} linked to unknown view {}", wall.id, old);
                }
            }
        }

        pass
    }

    fn link_relations(&self, map: &IdentityMap, pending: &[PendingEdge]) -> usize {
        let mut scene = self.scene.write();
        let mut unresolved = 0;

        for edge in pending {
            let resolved = edge.resolve(map).and_then(|(child, target)| {
                let cabinet = scene.cabinet_mut(&child)?;
                cabinet.relations.set(edge.role, Some(target));
                Some(())
            });
            if resolved.is_none() {
                tracing::debug!(
                    "Leaving {} of {} unset: {} was not restored",
                    edge.role.field_name(),
                    edge.child,
                    edge.target
                );
                unresolved += 1;
            }
        }

        unresolved
    }

    fn link_groups_and_syncs(&self, map: &IdentityMap, document: &RoomDocument) -> (usize, usize) {
        let mut scene = self.scene.write();
        let mut dropped_groups = 0;
        let mut dropped_syncs = 0;

        for saved in document.cabinets.iter().filter(|c| !c.group.is_empty()) {
            let Some(owner) = map.cabinet(&saved.cabinet_id) else {
                dropped_groups += saved.group.len();
                continue;
            };
            let members: Vec<_> = saved
                .group
                .iter()
                .filter_map(|member| {
                    let live = map.cabinet(&member.cabinet_id).cloned();
                    if live.is_none() {
                        dropped_groups += 1;
                    }
                    live.map(|cabinet_id| GroupMember::new(cabinet_id, member.percentage))
                })
                .collect();
            scene.set_group(owner.clone(), members);
        }

        for record in &document.cabinet_syncs {
            let Some(source) = map.cabinet(&record.cabinet_id) else {
                dropped_syncs += record.synced_cabinet_ids.len();
                continue;
            };
            let (synced, dropped) = map.remap_all(&record.synced_cabinet_ids);
            dropped_syncs += dropped;
            scene.set_sync(source.clone(), synced);
        }

        (dropped_groups, dropped_syncs)
    }

    fn publish_outcome(&self, report: &RestoreReport) {
        self.events.emit(AppEvent::Restore(RestoreEvent::Completed {
            document_id: report.document_id.clone(),
            restored: report.created.len(),
            skipped: report.skipped.len(),
            dropped_references: report.dropped_references(),
        }));

        let mut problems = Vec::new();
        if !report.catalog.failed.is_empty() {
            problems.push(format!(
                "{} of {} products could not be loaded",
                report.catalog.failed.len(),
                report.catalog.requested
            ));
        }
        if !report.skipped.is_empty() {
            problems.push(format!(
                "{} cabinets could not be restored",
                report.skipped.len()
            ));
        }
        if !problems.is_empty() {
            self.events
                .emit(AppEvent::Notice(Notice::warning(problems.join("; "))));
        }
    }
}

impl std::fmt::Debug for SnapshotRestorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRestorer")
            .field("restoring", &self.is_restoring())
            .finish()
    }
}

/// Live view for `old`; a view the document never listed gets a fresh
/// "View N" on first use.
fn resolve_view(views: &mut ViewManager, map: &mut IdentityMap, old: &ViewId) -> ViewId {
    if let Some(existing) = map.view(old) {
        return existing.clone();
    }
    let new_id = views.create_view();
    map.insert_view(old.clone(), new_id.clone());
    new_id
}

fn panel_state_of(saved: &SavedCabinet) -> Option<PanelState> {
    let state = PanelState {
        dimension_values: saved.dimension_values.clone(),
        material_selections: saved.material_selections.clone(),
        material_color: saved.material_color.clone(),
        price: None,
    };
    (!state.is_empty()).then_some(state)
}
