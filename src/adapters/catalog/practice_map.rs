//! The built-in practice map catalog.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{apply_seeds, read_json, SeedsMap};
use crate::domain::errors::DomainResult;
use crate::domain::models::TargetCatalog;
use crate::domain::ports::TargetCatalogSource;

/// Rotation-family catalog of every practice-map tower, optionally with a
/// seeds map read on each load.
#[derive(Debug, Clone, Default)]
pub struct PracticeMapCatalog {
    seeds_map_path: Option<PathBuf>,
}

impl PracticeMapCatalog {
    pub fn new(seeds_map_path: Option<PathBuf>) -> Self {
        Self { seeds_map_path }
    }
}

#[async_trait]
impl TargetCatalogSource for PracticeMapCatalog {
    async fn load(&self) -> DomainResult<TargetCatalog> {
        let catalog = TargetCatalog::practice_map();
        let Some(path) = &self.seeds_map_path else {
            return Ok(catalog);
        };

        let seeds: SeedsMap = read_json(path).await?;
        let mut targets: BTreeMap<_, _> = catalog.iter().map(|t| (t.key.clone(), t.clone())).collect();
        apply_seeds(&mut targets, &seeds);
        Ok(TargetCatalog::new(targets.into_values())?)
    }
}
