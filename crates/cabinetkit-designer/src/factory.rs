//! Cabinet factory used by the restorer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::ProductCatalog;
use crate::model::{Cabinet, CabinetConfig, CabinetType, Dimensions, ProductRef};

/// What the restorer asks the factory to build.
#[derive(Debug, Clone, PartialEq)]
pub struct CabinetRequest {
    pub cabinet_type: CabinetType,
    pub subcategory_id: Option<String>,
    pub product: ProductRef,
}

/// Builds live cabinets and reports when the scene has caught up.
#[async_trait]
pub trait CabinetFactory: Send + Sync {
    /// Build a cabinet with a fresh identity, or `None` if this request
    /// cannot be satisfied.
    fn create_cabinet(&self, request: &CabinetRequest) -> Option<Cabinet>;

    /// Resolves once every cabinet created so far has finished its
    /// asynchronous setup. Relationship passes run after this.
    async fn settled(&self) {
        tokio::task::yield_now().await;
    }

    /// Structural defaults for a request, used to fill configuration the
    /// document never set.
    fn default_config(&self, _request: &CabinetRequest) -> CabinetConfig {
        CabinetConfig::default()
    }
}

/// Factory deriving dimensions and defaults from the product catalog cache.
#[derive(Debug)]
pub struct CatalogCabinetFactory {
    catalog: Arc<ProductCatalog>,
}

impl CatalogCabinetFactory {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }

    fn type_dimensions(cabinet_type: CabinetType) -> Option<Dimensions> {
        let dims = match cabinet_type {
            CabinetType::Base => Dimensions::new(600.0, 720.0, 560.0),
            CabinetType::Tall => Dimensions::new(600.0, 2100.0, 560.0),
            CabinetType::Top => Dimensions::new(600.0, 720.0, 320.0),
            CabinetType::Filler => Dimensions::new(50.0, 720.0, 560.0),
            CabinetType::Panel => Dimensions::new(16.0, 720.0, 560.0),
            CabinetType::Benchtop => Dimensions::new(600.0, 33.0, 600.0),
            CabinetType::Kicker => Dimensions::new(600.0, 150.0, 16.0),
            CabinetType::Bulkhead => Dimensions::new(600.0, 300.0, 350.0),
            CabinetType::Appliance => Dimensions::new(600.0, 850.0, 600.0),
            CabinetType::Unknown => return None,
        };
        Some(dims)
    }

    fn type_config(cabinet_type: CabinetType) -> CabinetConfig {
        match cabinet_type {
            CabinetType::Base | CabinetType::Top => CabinetConfig {
                shelf_count: Some(1),
                door_count: Some(2),
                ..Default::default()
            },
            CabinetType::Tall => CabinetConfig {
                shelf_count: Some(4),
                door_count: Some(2),
                ..Default::default()
            },
            CabinetType::Kicker => CabinetConfig {
                kicker_height: Some(150.0),
                ..Default::default()
            },
            _ => CabinetConfig::default(),
        }
    }
}

#[async_trait]
impl CabinetFactory for CatalogCabinetFactory {
    fn create_cabinet(&self, request: &CabinetRequest) -> Option<Cabinet> {
        let mut dimensions = Self::type_dimensions(request.cabinet_type)?;

        let schema = request
            .product
            .product_id
            .as_deref()
            .and_then(|id| self.catalog.get(id));
        if let Some(schema) = &schema {
            dimensions = schema.default_dimensions;
        }

        let mut cabinet = Cabinet::new(request.cabinet_type, dimensions);
        cabinet.subcategory_id = request.subcategory_id.clone();
        cabinet.product = request.product.clone();
        if cabinet.product.product_name.is_none() {
            cabinet.product.product_name = schema.map(|s| s.name);
        }
        cabinet.config = self.default_config(request);
        Some(cabinet)
    }

    fn default_config(&self, request: &CabinetRequest) -> CabinetConfig {
        let by_type = Self::type_config(request.cabinet_type);
        match request
            .product
            .product_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
        {
            Some(schema) => schema.default_config().or_defaults(&by_type),
            None => by_type,
        }
    }
}
