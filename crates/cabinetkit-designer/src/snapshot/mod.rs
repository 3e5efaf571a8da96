//! Snapshot serializer and two-pass restorer.

pub mod identity;
pub mod restorer;
pub mod serializer;

pub use identity::{IdentityMap, PendingEdge};
pub use restorer::{RestoreError, RestoreGuard, RestoreReport, SkippedCabinet, SnapshotRestorer};
pub use serializer::{serialize, DocumentStamp};
