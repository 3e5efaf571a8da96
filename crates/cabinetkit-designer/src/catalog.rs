//! Product catalog cache with batched prefetch.
//!
//! Restore pre-fetches every distinct product id referenced by a document
//! before rebuilding cabinets. Fetches run with bounded concurrency and
//! failures are isolated per id: a missing product never aborts the batch.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cabinetkit_core::{
    thread_safe_rw_map, AppEvent, CatalogError, CatalogEvent, EventBus, ThreadSafeRwMap,
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::model::{CabinetConfig, Dimensions};

/// Product data the factory needs to build a cabinet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSchema {
    pub product_id: String,
    pub name: String,
    pub default_dimensions: Dimensions,
    #[serde(default)]
    pub door_count: Option<u32>,
    #[serde(default)]
    pub drawer_count: Option<u32>,
    #[serde(default)]
    pub shelf_count: Option<u32>,
    #[serde(default)]
    pub has_overhang: Option<bool>,
}

impl ProductSchema {
    /// Structural defaults this product implies.
    pub fn default_config(&self) -> CabinetConfig {
        CabinetConfig {
            door_count: self.door_count,
            drawer_count: self.drawer_count,
            shelf_count: self.shelf_count,
            overhang: self.has_overhang,
            ..Default::default()
        }
    }
}

/// Remote or local source of product schemas.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_product(&self, product_id: &str) -> Result<ProductSchema, CatalogError>;
}

/// Source backed by a fixed set of schemas. Used offline and in tests.
#[derive(Debug, Default)]
pub struct InMemoryProductSource {
    products: ThreadSafeRwMap<String, ProductSchema>,
}

impl InMemoryProductSource {
    pub fn new() -> Self {
        Self {
            products: thread_safe_rw_map(),
        }
    }

    pub fn with_products(products: impl IntoIterator<Item = ProductSchema>) -> Self {
        let source = Self::new();
        for product in products {
            source.insert(product);
        }
        source
    }

    pub fn insert(&self, product: ProductSchema) {
        self.products
            .write()
            .insert(product.product_id.clone(), product);
    }
}

#[async_trait]
impl ProductSource for InMemoryProductSource {
    async fn fetch_product(&self, product_id: &str) -> Result<ProductSchema, CatalogError> {
        self.products
            .read()
            .get(product_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                product_id: product_id.to_string(),
            })
    }
}

/// Source reading one `<product_id>.json` schema file per product from a
/// directory.
#[derive(Debug, Clone)]
pub struct DirectoryProductSource {
    root: PathBuf,
}

impl DirectoryProductSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ids that could escape the directory have no file.
    fn path_for(&self, product_id: &str) -> Option<PathBuf> {
        let plain = !product_id.is_empty()
            && !product_id.starts_with('.')
            && !product_id.contains(['/', '\\']);
        plain.then(|| self.root.join(format!("{}.json", product_id)))
    }
}

#[async_trait]
impl ProductSource for DirectoryProductSource {
    async fn fetch_product(&self, product_id: &str) -> Result<ProductSchema, CatalogError> {
        let not_found = || CatalogError::NotFound {
            product_id: product_id.to_string(),
        };
        let invalid = |reason: String| CatalogError::InvalidSchema {
            product_id: product_id.to_string(),
            reason,
        };

        let path = self.path_for(product_id).ok_or_else(not_found)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(err) => {
                return Err(CatalogError::FetchFailed {
                    product_id: product_id.to_string(),
                    reason: format!("{}: {}", path.display(), err),
                })
            }
        };

        let schema: ProductSchema =
            serde_json::from_str(&content).map_err(|err| invalid(err.to_string()))?;
        if schema.product_id != product_id {
            return Err(invalid(format!("file describes {}", schema.product_id)));
        }
        if !schema.default_dimensions.is_valid() {
            return Err(invalid("default dimensions must be finite and non-negative".to_string()));
        }
        Ok(schema)
    }
}

/// Outcome of one prefetch batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchSummary {
    /// Distinct ids that were not cached yet.
    pub requested: usize,
    pub loaded: usize,
    pub failed: Vec<CatalogError>,
}

impl PrefetchSummary {
    pub fn failed_ids(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|e| e.product_id().to_string())
            .collect()
    }
}

/// Caching front for a [`ProductSource`].
pub struct ProductCatalog {
    source: Arc<dyn ProductSource>,
    cache: ThreadSafeRwMap<String, ProductSchema>,
    max_concurrent: usize,
    events: Arc<EventBus>,
}

impl ProductCatalog {
    pub fn new(source: Arc<dyn ProductSource>, max_concurrent: usize, events: Arc<EventBus>) -> Self {
        Self {
            source,
            cache: thread_safe_rw_map(),
            max_concurrent: max_concurrent.max(1),
            events,
        }
    }

    /// Cached schema, if it has been fetched.
    pub fn get(&self, product_id: &str) -> Option<ProductSchema> {
        self.cache.read().get(product_id).cloned()
    }

    pub fn insert(&self, schema: ProductSchema) {
        self.cache.write().insert(schema.product_id.clone(), schema);
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Fetch every distinct, uncached id and cache the results.
    pub async fn prefetch<I, S>(&self, product_ids: I) -> PrefetchSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: BTreeSet<String> = {
            let cache = self.cache.read();
            product_ids
                .into_iter()
                .map(|id| id.as_ref().to_string())
                .filter(|id| !id.is_empty() && !cache.contains_key(id))
                .collect()
        };

        let mut summary = PrefetchSummary {
            requested: wanted.len(),
            ..Default::default()
        };
        if wanted.is_empty() {
            return summary;
        }

        tracing::debug!("Prefetching {} products", wanted.len());

        let results: Vec<Result<ProductSchema, CatalogError>> = stream::iter(wanted)
            .map(|id| {
                let source = Arc::clone(&self.source);
                async move { source.fetch_product(&id).await }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for result in results {
            match result {
                Ok(schema) => {
                    self.insert(schema);
                    summary.loaded += 1;
                }
                Err(err) => {
                    tracing::warn!("Product fetch failed: {}", err);
                    summary.failed.push(err);
                }
            }
        }
        summary
            .failed
            .sort_by(|a, b| a.product_id().cmp(b.product_id()));

        self.events.emit(AppEvent::Catalog(CatalogEvent::PrefetchCompleted {
            requested: summary.requested,
            loaded: summary.loaded,
            failed: summary.failed_ids(),
        }));

        summary
    }
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("cached", &self.cached_count())
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}
