//! Attempt ledger held in memory.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Attempt, NewAttempt, WindowFilter};
use crate::domain::ports::{AttemptLedger, AttemptRecorder};

#[derive(Default)]
pub struct InMemoryAttemptLedger {
    attempts: RwLock<Vec<Attempt>>,
    unavailable: AtomicBool,
}

impl InMemoryAttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> DomainResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Unavailable("attempt ledger offline".to_string()));
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.attempts.read().await.is_empty()
    }
}

#[async_trait]
impl AttemptLedger for InMemoryAttemptLedger {
    async fn window(&self, filter: &WindowFilter) -> DomainResult<Vec<Attempt>> {
        self.check()?;
        Ok(filter.apply(&self.attempts.read().await))
    }
}

#[async_trait]
impl AttemptRecorder for InMemoryAttemptLedger {
    async fn record(&self, attempt: &NewAttempt) -> DomainResult<i64> {
        self.check()?;
        let mut attempts = self.attempts.write().await;
        let id = attempts.last().map_or(1, |a| a.id + 1);
        attempts.push(Attempt {
            id,
            target_key: attempt.target_key.to_string(),
            outcome: attempt.outcome,
            seed_mode: attempt.seed_mode,
            standing_height: attempt.standing_height,
            seed: attempt.seed,
            recorded_at: attempt.recorded_at,
        });
        Ok(id)
    }
}
