//! Live scene model types.

pub mod cabinet;
pub mod ids;
pub mod view;
pub mod walls;

pub use cabinet::{
    ApplianceGaps, BenchtopConfig, Cabinet, CabinetConfig, CabinetType, Dimensions, GroupMember,
    LockFlags, ParentRelations, ParentRole, Position, ProductRef,
};
pub use ids::{CabinetId, ViewId, WallId};
pub use view::{View, ViewManager};
pub use walls::{AdditionalWall, CameraState, WallSettings, WallVisibility};
