//! Error handling for CabinetKit
//!
//! Provides error types for the layers of the snapshot engine:
//! - Document errors (malformed or structurally invalid room documents)
//! - Catalog errors (product data fetches)
//! - History errors (checkpoint navigation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Room document error type
///
/// Raised only for documents that cannot be restored at all. Partial
/// failures (a cabinet the factory cannot build, a dangling reference)
/// are not errors; they are logged and reported in the restore summary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The document could not be parsed
    #[error("Malformed room document: {reason}")]
    Malformed {
        /// The reason parsing failed.
        reason: String,
    },

    /// Two cabinets in the same document share an identity
    #[error("Duplicate cabinet id in document: {cabinet_id}")]
    DuplicateCabinetId {
        /// The duplicated identity.
        cabinet_id: String,
    },

    /// A cabinet carries dimensions that cannot describe a solid
    #[error("Invalid dimensions for cabinet {cabinet_id}: {reason}")]
    InvalidDimensions {
        /// The offending cabinet identity.
        cabinet_id: String,
        /// What is wrong with the dimensions.
        reason: String,
    },

    /// The document format version is not understood
    #[error("Unsupported room document version: {version}")]
    UnsupportedVersion {
        /// The version string found in the document.
        version: String,
    },
}

/// Product catalog error type
///
/// Failures are isolated per product id; the batch they belong to keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no product with this id
    #[error("Product not found: {product_id}")]
    NotFound {
        /// The missing product id.
        product_id: String,
    },

    /// The fetch itself failed (network, storage, ...)
    #[error("Failed to fetch product {product_id}: {reason}")]
    FetchFailed {
        /// The product id being fetched.
        product_id: String,
        /// The reason the fetch failed.
        reason: String,
    },

    /// The catalog returned data that is not a usable schema
    #[error("Invalid schema for product {product_id}: {reason}")]
    InvalidSchema {
        /// The product id.
        product_id: String,
        /// What is wrong with the schema.
        reason: String,
    },
}

impl CatalogError {
    /// The product id this error refers to
    pub fn product_id(&self) -> &str {
        match self {
            CatalogError::NotFound { product_id }
            | CatalogError::FetchFailed { product_id, .. }
            | CatalogError::InvalidSchema { product_id, .. } => product_id,
        }
    }
}

/// Checkpoint history error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Index outside the combined past/future sequence
    #[error("Checkpoint index {index} out of range (history has {len} entries)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Total number of checkpoints.
        len: usize,
    },
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Malformed {
            reason: err.to_string(),
        }
    }
}
