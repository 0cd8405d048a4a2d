//! Practice state repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PracticeState;

/// Repository interface for per-session practice state.
#[async_trait]
pub trait PracticeStateRepository: Send + Sync {
    /// Load the state for a session, `None` if it was never saved.
    async fn load(&self, session_key: &str) -> DomainResult<Option<PracticeState>>;

    /// Replace the stored state for `state.session_key`.
    async fn save(&self, state: &PracticeState) -> DomainResult<()>;
}
