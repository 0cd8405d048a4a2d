//! Common test utilities for integration tests
//!
//! Engine harnesses over the in-memory adapters, plus gated adapters that
//! park a call until the test releases it.

#![allow(dead_code)]

use async_trait::async_trait;
use rand::rngs::mock::StepRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

use zero_coach::adapters::memory::{InMemoryAttemptLedger, InMemoryPracticeStateRepository, StaticCatalogSource};
use zero_coach::domain::models::{EngineConfig, PracticeState};
use zero_coach::{
    Attempt, AttemptLedger, AttemptOutcome, AttemptRecorder, DomainResult, EngineSettings, NewAttempt,
    PracticeEngine, PracticeStateRepository, Target, TargetCatalog, TargetKey, WindowFilter,
};

pub const A: &str = "mpk|A|Front|1";
pub const B: &str = "mpk|B|Front|1";
pub const C: &str = "mpk|C|Front|1";

/// Setup test logging
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

pub fn key(raw: &str) -> TargetKey {
    TargetKey::parse(raw).unwrap()
}

/// Three level targets; B has low leniency, A carries seeds.
pub fn abc_catalog() -> TargetCatalog {
    TargetCatalog::new(vec![
        Target::new(key(A)).with_leniency(2.0).with_seeds(vec![100, 200]),
        Target::new(key(B)).with_leniency(0.2),
        Target::new(key(C)).with_leniency(2.0),
    ])
    .unwrap()
}

pub fn settings(configure: impl FnOnce(&mut EngineConfig)) -> EngineSettings {
    let mut engine = EngineConfig::default();
    configure(&mut engine);
    EngineSettings { engine, session_key: "test".to_string(), legal_mode: false }
}

/// An engine over in-memory adapters with a zero random source, so every
/// weighted draw lands on the first mode with weight.
pub struct Harness {
    pub catalog: Arc<StaticCatalogSource>,
    pub ledger: Arc<InMemoryAttemptLedger>,
    pub states: Arc<InMemoryPracticeStateRepository>,
    pub engine: Arc<PracticeEngine>,
}

impl Harness {
    pub fn new(catalog: TargetCatalog, settings: EngineSettings) -> Self {
        let catalog = Arc::new(StaticCatalogSource::new(catalog));
        let ledger = Arc::new(InMemoryAttemptLedger::new());
        let states = Arc::new(InMemoryPracticeStateRepository::new());
        let engine = Arc::new(PracticeEngine::with_rng(
            catalog.clone(),
            ledger.clone(),
            states.clone(),
            settings,
            Box::new(StepRng::new(0, 0)),
        ));
        Self { catalog, ledger, states, engine }
    }

    pub async fn record(&self, raw: &str, outcome: AttemptOutcome) -> i64 {
        self.ledger.record(&NewAttempt::new(key(raw), outcome)).await.unwrap()
    }

    pub async fn record_n(&self, raw: &str, successes: usize, fails: usize) {
        for _ in 0..successes {
            self.record(raw, AttemptOutcome::Success).await;
        }
        for _ in 0..fails {
            self.record(raw, AttemptOutcome::Fail).await;
        }
    }

    pub async fn state(&self) -> Option<PracticeState> {
        self.states.load(&self.engine.settings().session_key).await.unwrap()
    }
}

/// Parks calls while armed and signals when one has entered.
pub struct Gate {
    armed: AtomicBool,
    permits: Semaphore,
    entered: Notify,
}

impl Default for Gate {
    fn default() -> Self {
        Self { armed: AtomicBool::new(false), permits: Semaphore::new(0), entered: Notify::new() }
    }
}

impl Gate {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    /// Only the first call after arming is parked.
    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            if let Ok(permit) = self.permits.acquire().await {
                permit.forget();
            }
        }
    }
}

pub struct GatedLedger {
    pub inner: Arc<InMemoryAttemptLedger>,
    pub gate: Arc<Gate>,
}

#[async_trait]
impl AttemptLedger for GatedLedger {
    async fn window(&self, filter: &WindowFilter) -> DomainResult<Vec<Attempt>> {
        self.gate.pass().await;
        self.inner.window(filter).await
    }
}

pub struct GatedStateRepository {
    pub inner: Arc<InMemoryPracticeStateRepository>,
    pub gate: Arc<Gate>,
}

#[async_trait]
impl PracticeStateRepository for GatedStateRepository {
    async fn load(&self, session_key: &str) -> DomainResult<Option<PracticeState>> {
        self.gate.pass().await;
        self.inner.load(session_key).await
    }

    async fn save(&self, state: &PracticeState) -> DomainResult<()> {
        self.inner.save(state).await
    }
}

/// Engine over arbitrary ports with the zero random source.
pub fn engine_with(
    catalog: Arc<dyn zero_coach::TargetCatalogSource>,
    ledger: Arc<dyn AttemptLedger>,
    states: Arc<dyn PracticeStateRepository>,
    settings: EngineSettings,
) -> PracticeEngine {
    PracticeEngine::with_rng(catalog, ledger, states, settings, Box::new(StepRng::new(0, 0)))
}
