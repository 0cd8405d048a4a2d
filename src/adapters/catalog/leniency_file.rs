//! Level-family catalog built from per-side leniency documents.
//!
//! Each document lists `(tower, side, standing height, o-level, leniency)`
//! rows. Rows collapse into one target per `(tower, side, o-level)` whose
//! leniency is the best standing height's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{apply_seeds, read_json, SeedsMap};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Side, Target, TargetCatalog, TargetKey};
use crate::domain::ports::TargetCatalogSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeniencyEntry {
    pub tower_name: String,
    #[serde(default)]
    pub tower_height: Option<i32>,
    /// Falls back to the document side when absent
    #[serde(default)]
    pub side: Option<String>,
    pub standing_height: i32,
    pub o_level: i32,
    pub leniency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeniencyDocument {
    pub side: String,
    #[serde(default)]
    pub entries: Vec<LeniencyEntry>,
}

fn parse_side(raw: &str) -> DomainResult<Side> {
    Side::from_str(raw).ok_or_else(|| DomainError::ValidationFailed(format!("invalid side '{raw}'")))
}

/// Collapse leniency documents into catalog targets.
pub fn targets_from_documents(documents: &[LeniencyDocument]) -> DomainResult<BTreeMap<TargetKey, Target>> {
    let mut targets: BTreeMap<TargetKey, Target> = BTreeMap::new();
    for document in documents {
        let default_side = parse_side(&document.side)?;
        for entry in &document.entries {
            if !entry.leniency.is_finite() {
                return Err(DomainError::ValidationFailed(format!(
                    "non-finite leniency for {} O{}",
                    entry.tower_name, entry.o_level
                )));
            }
            let side = entry.side.as_deref().map(parse_side).transpose()?.unwrap_or(default_side);
            let key = TargetKey::mpk(&entry.tower_name, side, entry.o_level)?;
            targets
                .entry(key.clone())
                .or_insert_with(|| Target::new(key))
                .add_standing_height(entry.standing_height, entry.leniency);
        }
    }
    Ok(targets)
}

#[derive(Debug, Clone)]
pub struct LeniencyFileCatalog {
    front_path: PathBuf,
    back_path: PathBuf,
    seeds_map_path: Option<PathBuf>,
}

impl LeniencyFileCatalog {
    pub fn new(front_path: PathBuf, back_path: PathBuf, seeds_map_path: Option<PathBuf>) -> Self {
        Self { front_path, back_path, seeds_map_path }
    }
}

#[async_trait]
impl TargetCatalogSource for LeniencyFileCatalog {
    async fn load(&self) -> DomainResult<TargetCatalog> {
        let front: LeniencyDocument = read_json(&self.front_path).await?;
        let back: LeniencyDocument = read_json(&self.back_path).await?;
        let mut targets = targets_from_documents(&[front, back])?;

        if let Some(path) = &self.seeds_map_path {
            let seeds: SeedsMap = read_json(path).await?;
            apply_seeds(&mut targets, &seeds);
        }
        Ok(TargetCatalog::new(targets.into_values())?)
    }
}
