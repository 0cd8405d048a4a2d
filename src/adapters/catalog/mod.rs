//! Target catalog sources.

pub mod leniency_file;
pub mod practice_map;

pub use leniency_file::{LeniencyDocument, LeniencyEntry, LeniencyFileCatalog};
pub use practice_map::PracticeMapCatalog;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CatalogConfig, CatalogSourceKind, Target, TargetKey};
use crate::domain::ports::TargetCatalogSource;

/// `{ "<target key>": [seed, ...] }`
pub type SeedsMap = BTreeMap<String, Vec<i64>>;

/// Read and parse a JSON document.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> DomainResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Unavailable(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| DomainError::SerializationError(format!("{}: {e}", path.display())))
}

/// Attach seeds to the targets they name. Entries that do not parse or name
/// no target are skipped.
pub fn apply_seeds(targets: &mut BTreeMap<TargetKey, Target>, seeds: &SeedsMap) {
    for (raw, list) in seeds {
        let key = match TargetKey::parse(raw) {
            Ok(key) => key,
            Err(err) => {
                warn!(key = %raw, error = %err, "ignoring seeds for invalid key");
                continue;
            }
        };
        match targets.get_mut(&key) {
            Some(target) => target.seeds.clone_from(list),
            None => warn!(key = %key, "ignoring seeds for target outside the catalog"),
        }
    }
}

/// Build the catalog source selected by configuration.
pub fn catalog_from_config(config: &CatalogConfig) -> DomainResult<Arc<dyn TargetCatalogSource>> {
    let seeds = config.seeds_map_path.as_ref().map(Into::into);
    match config.source {
        CatalogSourceKind::PracticeMap => Ok(Arc::new(PracticeMapCatalog::new(seeds))),
        CatalogSourceKind::LeniencyFiles => {
            let (Some(front), Some(back)) = (&config.front_leniency_path, &config.back_leniency_path) else {
                return Err(DomainError::ValidationFailed(
                    "leniency_files catalog needs front_leniency_path and back_leniency_path".to_string(),
                ));
            };
            Ok(Arc::new(LeniencyFileCatalog::new(front.into(), back.into(), seeds)))
        }
    }
}
