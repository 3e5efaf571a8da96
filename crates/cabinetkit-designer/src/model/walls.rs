//! Room walls and camera.

use serde::{Deserialize, Serialize};

use super::ids::{ViewId, WallId};

/// Per-wall visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallVisibility {
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for WallVisibility {
    fn default() -> Self {
        Self {
            back: true,
            left: true,
            right: true,
        }
    }
}

/// Free-standing wall placed along the back wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalWall {
    pub id: WallId,
    pub distance_from_left: f64,
    pub thickness: f64,
    /// View shown when the wall is selected; remapped on restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_view_id: Option<ViewId>,
}

impl AdditionalWall {
    pub fn new(distance_from_left: f64, thickness: f64) -> Self {
        Self {
            id: WallId::generate(),
            distance_from_left,
            thickness,
            linked_view_id: None,
        }
    }
}

/// Room shell settings, stored verbatim in room documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WallSettings {
    pub height: f64,
    pub back_wall_length: f64,
    pub left_wall_length: f64,
    pub right_wall_length: f64,
    pub visibility: WallVisibility,
    pub additional_walls: Vec<AdditionalWall>,
    pub wall_color: String,
}

impl Default for WallSettings {
    fn default() -> Self {
        Self {
            height: 2400.0,
            back_wall_length: 4000.0,
            left_wall_length: 3000.0,
            right_wall_length: 3000.0,
            visibility: WallVisibility::default(),
            additional_walls: Vec::new(),
            wall_color: "#f5f5f0".to_string(),
        }
    }
}

/// Camera pose. Not part of room documents; a restore leaves it untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub zoom: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: [2000.0, 1600.0, 4000.0],
            target: [2000.0, 900.0, 0.0],
            zoom: 1.0,
        }
    }
}
