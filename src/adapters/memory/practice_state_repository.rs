//! Practice state held in memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::PracticeState;
use crate::domain::ports::PracticeStateRepository;

#[derive(Default)]
pub struct InMemoryPracticeStateRepository {
    states: RwLock<HashMap<String, PracticeState>>,
    unavailable: AtomicBool,
}

impl InMemoryPracticeStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> DomainResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("practice state store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PracticeStateRepository for InMemoryPracticeStateRepository {
    async fn load(&self, session_key: &str) -> DomainResult<Option<PracticeState>> {
        self.check()?;
        Ok(self.states.read().await.get(session_key).cloned())
    }

    async fn save(&self, state: &PracticeState) -> DomainResult<()> {
        self.check()?;
        self.states.write().await.insert(state.session_key.clone(), state.clone());
        Ok(())
    }
}
