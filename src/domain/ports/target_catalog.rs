//! Target catalog port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::TargetCatalog;

/// Source of the active target catalog.
#[async_trait]
pub trait TargetCatalogSource: Send + Sync {
    async fn load(&self) -> DomainResult<TargetCatalog>;
}
