//! Practice engine service.
//!
//! Wraps the pure assembler with the ports it reads from and the state it
//! persists. Every mutation and the streak transition of an evaluation run
//! behind one async mutation barrier; catalog and ledger reads happen outside
//! it. Evaluations carry a ticket so a request overtaken by a newer one is
//! discarded instead of applied.

use chrono::Utc;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    EngineConfig, LockList, OverrideOutcome, PracticeState, Recommendation, StreakStatus, TargetKey,
    WindowFilter,
};
use crate::domain::ports::{AttemptLedger, PracticeStateRepository, TargetCatalogSource};
use crate::services::coverage_calculator::{CoverageCalculator, CoverageReport};
use crate::services::manual_layer::ManualLayer;
use crate::services::recommendation_assembler::{assemble, unavailable, AssemblyInput};
use crate::services::streak_machine::StreakMachine;

/// Largest accepted leniency threshold.
pub const MAX_LENIENCY_THRESHOLD: f64 = 1000.0;

/// One evaluation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluateRequest {
    pub filter: WindowFilter,
    /// Overrides the persisted threshold for this call only
    pub leniency_threshold: Option<f64>,
}

impl EvaluateRequest {
    pub fn new(filter: WindowFilter) -> Self {
        Self { filter, leniency_threshold: None }
    }

    pub fn with_leniency_threshold(mut self, threshold: Option<f64>) -> Self {
        self.leniency_threshold = threshold;
        self
    }
}

/// Settings the engine is constructed with.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub engine: EngineConfig,
    pub session_key: String,
    pub legal_mode: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { engine: EngineConfig::default(), session_key: "default".to_string(), legal_mode: false }
    }
}

/// Reject NaN, infinite, negative and out-of-range thresholds.
pub fn validate_threshold(value: f64) -> EngineResult<f64> {
    let reason = if value.is_nan() {
        "must be a number"
    } else if value.is_infinite() {
        "must be finite"
    } else if value < 0.0 {
        "must not be negative"
    } else if value > MAX_LENIENCY_THRESHOLD {
        "must not exceed 1000"
    } else {
        return Ok(value);
    };
    Err(EngineError::InvalidThreshold { value, reason: reason.to_string() })
}

fn parse_key(raw: &str) -> EngineResult<TargetKey> {
    TargetKey::parse(raw).map_err(|e| EngineError::invalid_key(raw, &e))
}

/// Stateful recommendation engine for one practice session.
pub struct PracticeEngine {
    catalog: Arc<dyn TargetCatalogSource>,
    ledger: Arc<dyn AttemptLedger>,
    states: Arc<dyn PracticeStateRepository>,
    settings: EngineSettings,
    barrier: Mutex<Box<dyn RngCore + Send>>,
    tickets: AtomicU64,
}

impl PracticeEngine {
    /// Build an engine whose random source is seeded from `rng_seed` or entropy.
    pub fn new(
        catalog: Arc<dyn TargetCatalogSource>,
        ledger: Arc<dyn AttemptLedger>,
        states: Arc<dyn PracticeStateRepository>,
        settings: EngineSettings,
    ) -> Self {
        let rng: Box<dyn RngCore + Send> = match settings.engine.rng_seed {
            Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
            None => Box::new(ChaCha8Rng::from_entropy()),
        };
        Self::with_rng(catalog, ledger, states, settings, rng)
    }

    /// Build an engine with an explicit random source.
    pub fn with_rng(
        catalog: Arc<dyn TargetCatalogSource>,
        ledger: Arc<dyn AttemptLedger>,
        states: Arc<dyn PracticeStateRepository>,
        settings: EngineSettings,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self { catalog, ledger, states, settings, barrier: Mutex::new(rng), tickets: AtomicU64::new(0) }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    async fn acquire(&self) -> EngineResult<MutexGuard<'_, Box<dyn RngCore + Send>>> {
        let timeout = Duration::from_millis(self.settings.engine.mutation_timeout_ms);
        tokio::time::timeout(timeout, self.barrier.lock()).await.map_err(|_| {
            warn!(timeout_ms = self.settings.engine.mutation_timeout_ms, "mutation barrier busy");
            EngineError::Busy
        })
    }

    async fn load_state(&self) -> EngineResult<PracticeState> {
        let loaded = self
            .states
            .load(&self.settings.session_key)
            .await
            .map_err(|e| EngineError::StateUnavailable(e.to_string()))?;
        Ok(loaded.unwrap_or_else(|| {
            PracticeState::new(self.settings.session_key.clone(), self.settings.engine.min_streak_to_swap)
        }))
    }

    async fn save_state(&self, state: &PracticeState) -> EngineResult<()> {
        self.states.save(state).await.map_err(|e| EngineError::StateUnavailable(e.to_string()))
    }

    /// Run one evaluation and persist the resulting streak transition.
    #[instrument(skip(self), fields(session = %self.settings.session_key))]
    pub async fn evaluate(&self, request: EvaluateRequest) -> EngineResult<Recommendation> {
        if let Some(threshold) = request.leniency_threshold {
            validate_threshold(threshold)?;
        }
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

        let catalog = self
            .catalog
            .load()
            .await
            .map_err(|e| EngineError::CatalogUnavailable(e.to_string()))?;
        let attempts = self
            .ledger
            .window(&request.filter)
            .await
            .map_err(|e| EngineError::LedgerUnavailable(e.to_string()))?;

        let mut rng = self.acquire().await?;
        if self.tickets.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "evaluation superseded");
            return Err(EngineError::Superseded);
        }

        let state = self.load_state().await?;
        let threshold = request.leniency_threshold.or(state.leniency_threshold);
        let input = AssemblyInput {
            catalog: &catalog,
            attempts: &attempts,
            filter: &request.filter,
            leniency_threshold: threshold,
            legal_mode: self.settings.legal_mode,
            config: &self.settings.engine,
            now: Utc::now(),
        };
        let assembly = assemble(&input, &state, &mut **rng);

        if assembly.state != state {
            self.save_state(&assembly.state).await?;
        }
        if assembly.recommendation.target_changed {
            info!(
                next = ?assembly.recommendation.next_key().map(TargetKey::as_str),
                mode = ?assembly.recommendation.mode,
                "target changed"
            );
        }
        Ok(assembly.recommendation)
    }

    /// Evaluate, degrading upstream failures to a disabled response. Invalid
    /// input and superseded evaluations are still reported as errors so an
    /// overtaken caller has nothing to render.
    pub async fn poll(&self, request: EvaluateRequest) -> EngineResult<Recommendation> {
        match self.evaluate(request).await {
            Ok(recommendation) => Ok(recommendation),
            Err(
                err @ (EngineError::InvalidThreshold { .. }
                | EngineError::InvalidTargetKey { .. }
                | EngineError::Superseded),
            ) => Err(err),
            Err(err) => {
                warn!(error = %err, "evaluation degraded to disabled response");
                let state = self.states.load(&self.settings.session_key).await.ok().flatten();
                Ok(unavailable(
                    &self.settings.engine,
                    &request.filter,
                    state.as_ref(),
                    self.settings.legal_mode,
                    err.to_string(),
                    Utc::now(),
                ))
            }
        }
    }

    /// Per-target statistics for the window without touching any state.
    #[instrument(skip(self))]
    pub async fn coverage(&self, request: EvaluateRequest) -> EngineResult<CoverageReport> {
        if let Some(threshold) = request.leniency_threshold {
            validate_threshold(threshold)?;
        }
        let catalog = self
            .catalog
            .load()
            .await
            .map_err(|e| EngineError::CatalogUnavailable(e.to_string()))?;
        let attempts = self
            .ledger
            .window(&request.filter)
            .await
            .map_err(|e| EngineError::LedgerUnavailable(e.to_string()))?;
        let threshold = match request.leniency_threshold {
            Some(t) => Some(t),
            None => self.load_state().await?.leniency_threshold,
        };

        let engine = &self.settings.engine;
        let calculator = CoverageCalculator::new(engine.min_samples_per_target, engine.sufficiency_threshold_percent);
        Ok(calculator.calculate(&catalog, &attempts, threshold))
    }

    /// Add or remove a key; `desired_state` of `None` toggles.
    #[instrument(skip(self))]
    pub async fn toggle_lock(&self, target_key: &str, desired_state: Option<bool>) -> EngineResult<LockList> {
        let key = parse_key(target_key)?;
        self.mutate(|state| {
            let member = state.lock_list.toggle(&key, desired_state);
            debug!(target_key = %key, member, "lock list toggled");
            state.lock_list.clone()
        })
        .await
    }

    /// Replace the lock list with exactly one key.
    #[instrument(skip(self))]
    pub async fn set_single_lock(&self, target_key: &str) -> EngineResult<LockList> {
        let key = parse_key(target_key)?;
        self.mutate(|state| {
            state.lock_list.set_single(&key);
            state.lock_list.clone()
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn clear_locks(&self) -> EngineResult<LockList> {
        self.mutate(|state| {
            state.lock_list.clear();
            state.lock_list.clone()
        })
        .await
    }

    pub async fn lock_list(&self) -> EngineResult<LockList> {
        Ok(self.load_state().await?.lock_list)
    }

    /// Request the full-random override. A no-op reported as forced while
    /// legal mode is on.
    #[instrument(skip(self))]
    pub async fn set_full_random_override(&self, enabled: bool) -> EngineResult<OverrideOutcome> {
        let layer = ManualLayer::new(self.settings.legal_mode);
        let outcome = self.mutate(|state| layer.set_override(state, enabled)).await?;
        if outcome.forced {
            info!("full-random override forced off by legal mode");
        }
        Ok(outcome)
    }

    /// Unlock the current target and exclude it from the next evaluation.
    #[instrument(skip(self))]
    pub async fn skip_current_lock(&self) -> EngineResult<StreakStatus> {
        let machine = StreakMachine::new(self.settings.engine.min_streak_to_swap);
        self.mutate(|state| {
            machine.skip(&mut state.streak);
            StreakStatus::from_state(&state.streak, 0)
        })
        .await
    }

    /// Persist the eligibility cutoff; `None` clears it.
    #[instrument(skip(self))]
    pub async fn set_leniency_threshold(&self, value: Option<f64>) -> EngineResult<Option<f64>> {
        if let Some(v) = value {
            validate_threshold(v)?;
        }
        self.mutate(|state| {
            state.leniency_threshold = value;
            state.leniency_threshold
        })
        .await
    }

    async fn mutate<T>(&self, apply: impl FnOnce(&mut PracticeState) -> T) -> EngineResult<T> {
        let _guard = self.acquire().await?;
        let mut state = self.load_state().await?;
        let result = apply(&mut state);
        state.updated_at = Utc::now();
        self.save_state(&state).await?;
        Ok(result)
    }
}
