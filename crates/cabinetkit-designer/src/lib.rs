//! # CabinetKit Designer
//!
//! Scene model and snapshot engine for the cabinet room designer.
//!
//! ## Core Components
//!
//! - **Scene**: cabinets, walls, views, proportional groups and syncs
//! - **Panel State Store**: last user-edited dimension and material values
//! - **Product Catalog**: cached product schemas with batched prefetch
//! - **Serializer**: flattens the scene into an immutable room document
//! - **Restorer**: rebuilds the scene from a document, minting fresh
//!   identities and remapping every cross-reference
//! - **Checkpoint History**: undo, redo, jump and decaying auto checkpoints
//!
//! ## Architecture
//!
//! ```text
//! CheckpointHistory
//!   └── SnapshotRestorer (single in-progress guard)
//!         ├── serialize(Scene, PanelStateStore) -> RoomDocument
//!         ├── ProductCatalog (prefetch)
//!         └── CabinetFactory (create + settled)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cabinetkit_designer::DesignerState;
//!
//! let mut state = DesignerState::new(&config, source);
//! state.history.create_checkpoint();
//! state.history.undo().await;
//! ```

pub mod catalog;
pub mod clock;
pub mod designer_state;
pub mod factory;
pub mod history;
pub mod model;
pub mod panel_state;
pub mod scene;
pub mod serialization;
pub mod snapshot;

pub use catalog::{
    DirectoryProductSource, InMemoryProductSource, PrefetchSummary, ProductCatalog, ProductSchema,
    ProductSource,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use designer_state::DesignerState;
pub use factory::{CabinetFactory, CabinetRequest, CatalogCabinetFactory};
pub use history::{
    AutoTickOutcome, Checkpoint, CheckpointHistory, CheckpointKind, CheckpointSummary,
    HistoryConfig,
};
pub use model::*;
pub use panel_state::{PanelState, PanelStateStore};
pub use scene::{RoomInfo, Scene};
pub use serialization::{
    CabinetSyncRecord, RoomDocument, SavedCabinet, SavedView, ROOM_FORMAT_VERSION,
};
pub use snapshot::{
    serialize, DocumentStamp, IdentityMap, PendingEdge, RestoreError, RestoreGuard,
    RestoreReport, SkippedCabinet, SnapshotRestorer,
};
