//! Attempt ledger port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Attempt, NewAttempt, WindowFilter};

/// Read access to the append-only attempt history.
#[async_trait]
pub trait AttemptLedger: Send + Sync {
    /// Scored attempts selected by the filter, ordered by ascending id.
    async fn window(&self, filter: &WindowFilter) -> DomainResult<Vec<Attempt>>;
}

/// Ledgers that can also append attempts.
#[async_trait]
pub trait AttemptRecorder: Send + Sync {
    /// Append an attempt and return its id.
    async fn record(&self, attempt: &NewAttempt) -> DomainResult<i64>;
}
