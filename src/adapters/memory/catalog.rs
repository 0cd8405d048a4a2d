//! Catalog source returning a fixed catalog.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::TargetCatalog;
use crate::domain::ports::TargetCatalogSource;

pub struct StaticCatalogSource {
    catalog: RwLock<TargetCatalog>,
    unavailable: AtomicBool,
}

impl StaticCatalogSource {
    pub fn new(catalog: TargetCatalog) -> Self {
        Self { catalog: RwLock::new(catalog), unavailable: AtomicBool::new(false) }
    }

    /// Swap the catalog served by later loads.
    pub fn replace(&self, catalog: TargetCatalog) {
        if let Ok(mut current) = self.catalog.write() {
            *current = catalog;
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl TargetCatalogSource for StaticCatalogSource {
    async fn load(&self) -> DomainResult<TargetCatalog> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("target catalog offline".to_string()));
        }
        self.catalog
            .read()
            .map(|catalog| catalog.clone())
            .map_err(|_| DomainError::Unavailable("target catalog lock poisoned".to_string()))
    }
}
