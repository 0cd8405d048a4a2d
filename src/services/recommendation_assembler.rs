//! Recommendation assembler.
//!
//! A pure function of the catalog, the attempt window, the engine
//! configuration, the persisted practice state, an injected random source and
//! the evaluation time. It returns the response and the next state to persist;
//! the caller decides whether to apply it.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::domain::models::{
    Attempt, CoverageSnapshot, DisabledReason, EngineConfig, FullRandomCause, OverrideState,
    PracticeState, Recommendation, RecommendationStatus, SelectionOutcome, SelectionReason,
    StreakStatus, TargetCatalog, TargetKey, TargetStats, WindowFilter,
};
use crate::services::coverage_calculator::CoverageCalculator;
use crate::services::manual_layer::ManualLayer;
use crate::services::seed_rotation::select_seed;
use crate::services::selection_policy::{SelectionInput, SelectionPolicy};
use crate::services::streak_machine::{LockCheck, StreakMachine};

/// Everything one evaluation reads besides the persisted state.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    pub catalog: &'a TargetCatalog,
    /// Scored attempts in the active window
    pub attempts: &'a [Attempt],
    pub filter: &'a WindowFilter,
    /// Threshold in force for this evaluation
    pub leniency_threshold: Option<f64>,
    pub legal_mode: bool,
    pub config: &'a EngineConfig,
    pub now: DateTime<Utc>,
}

/// Response plus the state to persist.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub recommendation: Recommendation,
    pub state: PracticeState,
}

/// Evaluate the engine once.
pub fn assemble<R: Rng + ?Sized>(input: &AssemblyInput<'_>, state: &PracticeState, rng: &mut R) -> Assembly {
    let config = input.config;
    let machine = StreakMachine::new(config.min_streak_to_swap);
    let calculator = CoverageCalculator::new(config.min_samples_per_target, config.sufficiency_threshold_percent);
    let layer = ManualLayer::new(input.legal_mode);
    let lock_list = layer.normalized_lock_list(state, input.catalog);
    let previous_pair = StreakMachine::pair(&state.streak);
    let previous_key = state.streak.current_target_key.clone();
    let window_max_id = input.attempts.iter().map(|a| a.id).max();

    if layer.override_effective(state) {
        let report = calculator.calculate(input.catalog, input.attempts, input.leniency_threshold);
        let mut recommendation = draft(input, state, report.snapshot.clone(), lock_list);
        recommendation.status = RecommendationStatus::FullRandom { cause: FullRandomCause::Override };
        recommendation.current = previous_key.as_ref().and_then(|k| report.get(k)).cloned();
        recommendation.selected_seed = None;
        tracing::debug!("full-random override in effect");
        return Assembly { recommendation, state: state.clone() };
    }

    let mut next = state.clone();
    next.updated_at = input.now;
    next.streak.min_streak_to_swap = machine.min_streak_to_swap();

    if input.catalog.is_empty() {
        let snapshot = CoverageSnapshot::empty(config.min_samples_per_target, config.sufficiency_threshold_percent);
        return disabled(input, &machine, next, snapshot, None, lock_list, DisabledReason::EmptyCatalog, previous_pair.is_some());
    }

    let report = calculator.calculate(input.catalog, input.attempts, input.leniency_threshold);
    let current = previous_key.as_ref().and_then(|k| report.get(k)).cloned();

    if !input.attempts.iter().any(|a| a.outcome.is_scored()) {
        return disabled(input, &machine, next, report.snapshot.clone(), current, lock_list, DisabledReason::EmptyWindow, previous_pair.is_some());
    }

    let scope = layer.scope(&report, &lock_list);
    if scope.is_empty() {
        let reason = if scope.lock_list_applied {
            DisabledReason::LockedTargetsIneligible
        } else {
            DisabledReason::NoEligibleTargets
        };
        return disabled(input, &machine, next, report.snapshot.clone(), current, lock_list, reason, previous_pair.is_some());
    }

    let sample_coverage = if scope.lock_list_applied {
        calculator.sample_coverage(scope.candidates.iter().copied())
    } else {
        report.snapshot.mode_coverage_percent
    };

    let pending_skip = next.streak.pending_skip_key.take();
    let in_scope = previous_key.as_ref().is_some_and(|k| scope.contains(k));
    let lock_check = machine.check_lock(&state.streak, in_scope, input.attempts);

    let mut lock_applied = false;
    let mut lock_completed = false;
    let mut mode = None;
    let mut requested_mode = None;
    let mut selection_reason = None;

    let status = match (lock_check, previous_key.as_ref()) {
        (LockCheck::Hold { .. }, Some(_)) => {
            machine.hold(&mut next.streak);
            lock_applied = true;
            mode = next.streak.current_selection_mode;
            requested_mode = mode;
            selection_reason = Some(SelectionReason::StreakLock);
            RecommendationStatus::Target
        }
        (check, _) => {
            let (exclude, force_switch) = match check {
                LockCheck::Completed { completion_streak } => {
                    lock_completed = true;
                    tracing::info!(
                        target_key = ?previous_key.as_ref().map(TargetKey::as_str),
                        completion_streak,
                        "lock completed"
                    );
                    (previous_key.as_ref(), true)
                }
                LockCheck::Released => {
                    tracing::info!(
                        target_key = ?previous_key.as_ref().map(TargetKey::as_str),
                        "locked target left candidate scope, releasing"
                    );
                    next.streak.lock_active = false;
                    next.streak.lock_anchor_attempt_id = None;
                    (pending_skip.as_ref(), false)
                }
                LockCheck::Unlocked | LockCheck::Hold { .. } => (pending_skip.as_ref(), false),
            };

            let policy = SelectionPolicy::from_config(config);
            let selection = SelectionInput {
                candidates: scope.candidates.clone(),
                sample_coverage,
                gate_coverage: report.snapshot.mode_coverage_percent,
                exclude,
            };
            match policy.decide(&selection, rng) {
                SelectionOutcome::Pick(pick) => {
                    machine.apply_pick(&mut next.streak, &pick, force_switch, window_max_id);
                    mode = Some(pick.mode);
                    requested_mode = Some(pick.requested_mode);
                    selection_reason = Some(pick.reason);
                    RecommendationStatus::Target
                }
                SelectionOutcome::FullRandom => {
                    machine.clear(&mut next.streak);
                    let cause = if policy.bootstrap_applies(selection.gate_coverage) {
                        FullRandomCause::Bootstrap
                    } else {
                        FullRandomCause::EmptyPools
                    };
                    RecommendationStatus::FullRandom { cause }
                }
                SelectionOutcome::Empty => {
                    return disabled(
                        input,
                        &machine,
                        next,
                        report.snapshot.clone(),
                        current,
                        lock_list,
                        DisabledReason::NoEligibleTargets,
                        previous_pair.is_some(),
                    );
                }
            }
        }
    };

    let next_key = next.streak.current_target_key.clone().filter(|_| status.is_target());
    let key_changed = next_key != previous_key;
    let target = next_key.as_ref().and_then(|k| input.catalog.get(k));
    let selected_seed = select_seed(&mut next.seeds, target, key_changed, window_max_id);
    let completion_streak = completion_for(&next, input.attempts);
    let target_changed = previous_pair.is_some() && StreakMachine::pair(&next.streak) != previous_pair;

    tracing::debug!(
        status = ?status,
        next = ?next_key.as_ref().map(TargetKey::as_str),
        mode = ?mode,
        streak = next.streak.streak_count,
        lock_active = next.streak.lock_active,
        coverage = report.snapshot.mode_coverage_percent,
        "evaluation assembled"
    );

    let mut recommendation = draft(input, &next, report.snapshot.clone(), lock_list);
    recommendation.status = status;
    recommendation.current = current;
    recommendation.next = next_key.as_ref().and_then(|k| report.get(k)).cloned();
    recommendation.mode = mode;
    recommendation.requested_mode = requested_mode;
    recommendation.selection_reason = selection_reason;
    recommendation.streak = StreakStatus::from_state(&next.streak, completion_streak);
    recommendation.lock_applied = lock_applied;
    recommendation.lock_list_applied = scope.lock_list_applied;
    recommendation.target_changed = target_changed;
    recommendation.lock_completed = lock_completed;
    recommendation.selected_seed = selected_seed;
    recommendation.load_command = next_key.as_ref().and_then(TargetKey::load_command);

    Assembly { recommendation, state: next }
}

/// Disabled response used when the engine could not read its inputs.
pub fn unavailable(
    config: &EngineConfig,
    filter: &WindowFilter,
    state: Option<&PracticeState>,
    legal_mode: bool,
    detail: String,
    now: DateTime<Utc>,
) -> Recommendation {
    let streak = state.map_or_else(
        || StreakStatus {
            streak_count: 0,
            min_streak_to_swap: config.min_streak_to_swap,
            lock_active: false,
            weak_lock_active: false,
            completion_streak: 0,
        },
        |s| StreakStatus::from_state(&s.streak, 0),
    );
    Recommendation {
        status: RecommendationStatus::Disabled { reason: DisabledReason::UpstreamUnavailable },
        coverage: CoverageSnapshot::empty(config.min_samples_per_target, config.sufficiency_threshold_percent),
        current: None,
        next: None,
        mode: None,
        requested_mode: None,
        selection_reason: None,
        streak,
        lock_applied: false,
        lock_list_applied: false,
        target_changed: false,
        lock_completed: false,
        lock_list: state.map(|s| s.lock_list.valid_keys()).unwrap_or_default(),
        override_state: state.map_or(
            OverrideState { requested: false, legal_mode },
            |s| s.override_state(legal_mode),
        ),
        leniency_threshold: state.and_then(|s| s.leniency_threshold),
        selected_seed: None,
        load_command: None,
        window_size: filter.size_hint(),
        detail: Some(detail),
        generated_at: now,
    }
}

fn completion_for(state: &PracticeState, attempts: &[Attempt]) -> u32 {
    match state.streak.current_target_key.as_ref() {
        Some(key) if state.streak.lock_active => {
            StreakMachine::completion_streak(key, state.streak.lock_anchor_attempt_id, attempts)
        }
        _ => 0,
    }
}

fn draft(
    input: &AssemblyInput<'_>,
    state: &PracticeState,
    coverage: CoverageSnapshot,
    lock_list: Vec<TargetKey>,
) -> Recommendation {
    Recommendation {
        status: RecommendationStatus::Target,
        coverage,
        current: None,
        next: None,
        mode: None,
        requested_mode: None,
        selection_reason: None,
        streak: StreakStatus::from_state(&state.streak, completion_for(state, input.attempts)),
        lock_applied: false,
        lock_list_applied: false,
        target_changed: false,
        lock_completed: false,
        lock_list,
        override_state: state.override_state(input.legal_mode),
        leniency_threshold: input.leniency_threshold,
        selected_seed: state.seeds.selected_seed,
        load_command: None,
        window_size: input.filter.size_hint(),
        detail: None,
        generated_at: input.now,
    }
}

#[allow(clippy::too_many_arguments)]
fn disabled(
    input: &AssemblyInput<'_>,
    machine: &StreakMachine,
    mut next: PracticeState,
    snapshot: CoverageSnapshot,
    current: Option<TargetStats>,
    lock_list: Vec<TargetKey>,
    reason: DisabledReason,
    had_target: bool,
) -> Assembly {
    machine.clear(&mut next.streak);
    next.seeds.selected_seed = None;
    tracing::debug!(reason = reason.as_str(), "no recommendation");

    let mut recommendation = draft(input, &next, snapshot, lock_list);
    recommendation.status = RecommendationStatus::Disabled { reason };
    recommendation.current = current;
    recommendation.target_changed = had_target;
    Assembly { recommendation, state: next }
}
