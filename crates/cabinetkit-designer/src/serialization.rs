//! Room document format.
//!
//! A room document is an immutable JSON snapshot of the scene. Cabinet
//! identities inside a document are scoped to that document; they are
//! remapped to fresh live identities when the document is restored.

use anyhow::{Context, Result};
use cabinetkit_core::DocumentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use uuid::Uuid;

use crate::model::{
    CabinetConfig, CabinetId, CabinetType, Dimensions, GroupMember, LockFlags, ParentRelations,
    Position, ProductRef, ViewId, WallSettings,
};

/// Room document format version
pub const ROOM_FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    ROOM_FORMAT_VERSION.to_string()
}

/// Complete room document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub wall_settings: WallSettings,
    #[serde(default)]
    pub cabinets: Vec<SavedCabinet>,
    #[serde(default)]
    pub views: Vec<SavedView>,
    #[serde(default)]
    pub cabinet_syncs: Vec<CabinetSyncRecord>,
}

/// One cabinet as captured in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCabinet {
    pub cabinet_id: CabinetId,
    #[serde(flatten)]
    pub product: ProductRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<String>,
    pub cabinet_type: CabinetType,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub view_id: Option<ViewId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_values: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_selections: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_color: Option<String>,
    #[serde(flatten)]
    pub config: CabinetConfig,
    #[serde(flatten)]
    pub locks: LockFlags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<GroupMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_number: Option<u32>,
    #[serde(flatten)]
    pub relations: ParentRelations,
}

impl SavedCabinet {
    /// Bare cabinet record with everything optional left unset.
    pub fn new(cabinet_id: CabinetId, cabinet_type: CabinetType, dimensions: Dimensions) -> Self {
        Self {
            cabinet_id,
            product: ProductRef::default(),
            subcategory_id: None,
            cabinet_type,
            dimensions,
            position: Position::default(),
            view_id: None,
            dimension_values: None,
            material_selections: None,
            material_color: None,
            config: CabinetConfig::default(),
            locks: LockFlags::default(),
            group: Vec::new(),
            sort_number: None,
            relations: ParentRelations::default(),
        }
    }
}

/// Saved view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub id: ViewId,
    pub name: String,
    #[serde(default)]
    pub cabinet_ids: Vec<CabinetId>,
}

/// Cabinets whose dimensions follow `cabinet_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinetSyncRecord {
    pub cabinet_id: CabinetId,
    #[serde(default)]
    pub synced_cabinet_ids: Vec<CabinetId>,
}

impl RoomDocument {
    /// Create an empty document stamped now
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category: None,
            saved_at: Utc::now(),
            wall_settings: WallSettings::default(),
            cabinets: Vec::new(),
            views: Vec::new(),
            cabinet_syncs: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save document to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize room")?;

        std::fs::write(path.as_ref(), json).context("Failed to write room file")?;

        Ok(())
    }

    /// Load document from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).context("Failed to read room file")?;

        let document: RoomDocument =
            serde_json::from_str(&content).context("Failed to parse room file")?;

        Ok(document)
    }

    /// Canonical JSON of everything except `id` and `savedAt`.
    ///
    /// Two captures of an unchanged scene produce the same key.
    pub fn content_key(&self) -> Result<String, DocumentError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("id");
            object.remove("savedAt");
        }
        Ok(value.to_string())
    }

    /// Reject documents that cannot be restored at all.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.version.split('.').next() != ROOM_FORMAT_VERSION.split('.').next() {
            return Err(DocumentError::UnsupportedVersion {
                version: self.version.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(self.cabinets.len());
        for cabinet in &self.cabinets {
            if !seen.insert(&cabinet.cabinet_id) {
                return Err(DocumentError::DuplicateCabinetId {
                    cabinet_id: cabinet.cabinet_id.to_string(),
                });
            }
            if !cabinet.dimensions.is_valid() {
                let d = cabinet.dimensions;
                return Err(DocumentError::InvalidDimensions {
                    cabinet_id: cabinet.cabinet_id.to_string(),
                    reason: format!(
                        "expected finite non-negative values, got {} x {} x {}",
                        d.width, d.height, d.depth
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn cabinet(&self, id: &CabinetId) -> Option<&SavedCabinet> {
        self.cabinets.iter().find(|c| &c.cabinet_id == id)
    }

    /// Product ids referenced by cabinets, in document order, possibly repeated.
    pub fn product_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.cabinets
            .iter()
            .filter_map(|c| c.product.product_id.as_deref())
    }
}
