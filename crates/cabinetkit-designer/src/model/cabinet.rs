//! Live cabinet model.

use serde::{Deserialize, Serialize};

use super::ids::{CabinetId, ViewId};

/// Cabinet category.
///
/// Unrecognised tags in a document deserialize to `Unknown`; the factory
/// refuses to build those, so they are skipped on restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinetType {
    Base,
    Tall,
    Top,
    Filler,
    Panel,
    Benchtop,
    Kicker,
    Bulkhead,
    Appliance,
    #[serde(other)]
    Unknown,
}

impl CabinetType {
    pub const ALL: [CabinetType; 9] = [
        CabinetType::Base,
        CabinetType::Tall,
        CabinetType::Top,
        CabinetType::Filler,
        CabinetType::Panel,
        CabinetType::Benchtop,
        CabinetType::Kicker,
        CabinetType::Bulkhead,
        CabinetType::Appliance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CabinetType::Base => "Base",
            CabinetType::Tall => "Tall",
            CabinetType::Top => "Top",
            CabinetType::Filler => "Filler",
            CabinetType::Panel => "Panel",
            CabinetType::Benchtop => "Benchtop",
            CabinetType::Kicker => "Kicker",
            CabinetType::Bulkhead => "Bulkhead",
            CabinetType::Appliance => "Appliance",
            CabinetType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for CabinetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Carcass size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// All three values finite and not negative.
    pub fn is_valid(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Optional external catalog reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl ProductRef {
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            product_id: Some(product_id.into()),
            product_name: Some(product_name.into()),
        }
    }
}

/// Clearances around a built-in appliance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplianceGaps {
    pub top: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchtopConfig {
    pub front_overhang: f64,
    pub left_overhang: f64,
    pub right_overhang: f64,
    pub thickness: f64,
    pub height_from_floor: f64,
}

/// Per-type structural configuration.
///
/// Every field is optional: `None` means "never configured" and the
/// catalog/factory default applies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CabinetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelf_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawer_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawer_heights: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overhang: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kicker_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appliance_gaps: Option<ApplianceGaps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchtop: Option<BenchtopConfig>,
}

impl CabinetConfig {
    /// Fill every unset field from `defaults`; set fields win.
    pub fn or_defaults(&self, defaults: &CabinetConfig) -> CabinetConfig {
        CabinetConfig {
            shelf_count: self.shelf_count.or(defaults.shelf_count),
            door_count: self.door_count.or(defaults.door_count),
            drawer_count: self.drawer_count.or(defaults.drawer_count),
            drawer_heights: self
                .drawer_heights
                .clone()
                .or_else(|| defaults.drawer_heights.clone()),
            overhang: self.overhang.or(defaults.overhang),
            kicker_height: self.kicker_height.or(defaults.kicker_height),
            appliance_gaps: self.appliance_gaps.or(defaults.appliance_gaps),
            benchtop: self.benchtop.or(defaults.benchtop),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LockFlags {
    pub left_lock: bool,
    pub right_lock: bool,
}

/// Which structural parent a relationship field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRole {
    Parent,
    KickerParent,
    BulkheadParent,
    UnderPanelParent,
    BenchtopParent,
}

impl ParentRole {
    pub const ALL: [ParentRole; 5] = [
        ParentRole::Parent,
        ParentRole::KickerParent,
        ParentRole::BulkheadParent,
        ParentRole::UnderPanelParent,
        ParentRole::BenchtopParent,
    ];

    /// Field name used in room documents.
    pub fn field_name(&self) -> &'static str {
        match self {
            ParentRole::Parent => "parentCabinetId",
            ParentRole::KickerParent => "kickerParentCabinetId",
            ParentRole::BulkheadParent => "bulkheadParentCabinetId",
            ParentRole::UnderPanelParent => "underPanelParentCabinetId",
            ParentRole::BenchtopParent => "benchtopParentCabinetId",
        }
    }
}

/// The five typed pointers from a child cabinet to its structural parents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentRelations {
    #[serde(rename = "parentCabinetId", skip_serializing_if = "Option::is_none")]
    pub parent: Option<CabinetId>,
    #[serde(rename = "kickerParentCabinetId", skip_serializing_if = "Option::is_none")]
    pub kicker_parent: Option<CabinetId>,
    #[serde(rename = "bulkheadParentCabinetId", skip_serializing_if = "Option::is_none")]
    pub bulkhead_parent: Option<CabinetId>,
    #[serde(
        rename = "underPanelParentCabinetId",
        skip_serializing_if = "Option::is_none"
    )]
    pub under_panel_parent: Option<CabinetId>,
    #[serde(
        rename = "benchtopParentCabinetId",
        skip_serializing_if = "Option::is_none"
    )]
    pub benchtop_parent: Option<CabinetId>,
}

impl ParentRelations {
    pub fn get(&self, role: ParentRole) -> Option<&CabinetId> {
        match role {
            ParentRole::Parent => self.parent.as_ref(),
            ParentRole::KickerParent => self.kicker_parent.as_ref(),
            ParentRole::BulkheadParent => self.bulkhead_parent.as_ref(),
            ParentRole::UnderPanelParent => self.under_panel_parent.as_ref(),
            ParentRole::BenchtopParent => self.benchtop_parent.as_ref(),
        }
    }

    pub fn set(&mut self, role: ParentRole, target: Option<CabinetId>) {
        let slot = match role {
            ParentRole::Parent => &mut self.parent,
            ParentRole::KickerParent => &mut self.kicker_parent,
            ParentRole::BulkheadParent => &mut self.bulkhead_parent,
            ParentRole::UnderPanelParent => &mut self.under_panel_parent,
            ParentRole::BenchtopParent => &mut self.benchtop_parent,
        };
        *slot = target;
    }

    /// Set relationships as `(role, target)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ParentRole, &CabinetId)> + '_ {
        ParentRole::ALL
            .into_iter()
            .filter_map(move |role| self.get(role).map(|id| (role, id)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Clear every field that points at `target`.
    pub fn detach(&mut self, target: &CabinetId) {
        for role in ParentRole::ALL {
            if self.get(role) == Some(target) {
                self.set(role, None);
            }
        }
    }
}

/// One member of a proportional-resize group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub cabinet_id: CabinetId,
    pub percentage: f64,
}

impl GroupMember {
    pub fn new(cabinet_id: CabinetId, percentage: f64) -> Self {
        Self {
            cabinet_id,
            percentage,
        }
    }
}

/// A cabinet in the live scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Cabinet {
    pub id: CabinetId,
    pub cabinet_type: CabinetType,
    pub subcategory_id: Option<String>,
    pub product: ProductRef,
    pub dimensions: Dimensions,
    pub position: Position,
    /// Cabinet-local view reference, kept alongside the view manager's record.
    pub view_id: Option<ViewId>,
    pub config: CabinetConfig,
    pub locks: LockFlags,
    pub sort_number: Option<u32>,
    pub relations: ParentRelations,
    /// Set after a restore so the UI does not re-apply schema defaults over
    /// restored dimensions.
    pub skip_dimension_defaults: bool,
}

impl Cabinet {
    /// Creates a cabinet with a fresh identity.
    pub fn new(cabinet_type: CabinetType, dimensions: Dimensions) -> Self {
        Self {
            id: CabinetId::generate(),
            cabinet_type,
            subcategory_id: None,
            product: ProductRef::default(),
            dimensions,
            position: Position::default(),
            view_id: None,
            config: CabinetConfig::default(),
            locks: LockFlags::default(),
            sort_number: None,
            relations: ParentRelations::default(),
            skip_dimension_defaults: false,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_product(mut self, product: ProductRef) -> Self {
        self.product = product;
        self
    }

    pub fn set_locks(&mut self, left_lock: bool, right_lock: bool) {
        self.locks = LockFlags {
            left_lock,
            right_lock,
        };
    }

    pub fn set_view_id(&mut self, view_id: Option<ViewId>) {
        self.view_id = view_id;
    }
}
