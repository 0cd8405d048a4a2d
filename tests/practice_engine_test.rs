//! Integration tests for the practice engine over in-memory adapters

mod common;

use std::sync::Arc;

use common::{engine_with, key, settings, Gate, GatedLedger, GatedStateRepository, Harness, A, B, C};
use zero_coach::adapters::memory::{InMemoryAttemptLedger, InMemoryPracticeStateRepository, StaticCatalogSource};
use zero_coach::domain::models::{
    DisabledReason, FullRandomCause, ModeBand, RecommendationStatus, SelectionMode, SelectionReason,
};
use zero_coach::{AttemptOutcome, EngineError, EvaluateRequest, TargetCatalog, WindowFilter};

fn harness() -> Harness {
    common::setup_test_logging();
    Harness::new(common::abc_catalog(), settings(|_| {}))
}

#[tokio::test]
async fn test_bootstrap_proposes_full_random() {
    let h = harness();
    h.record(A, AttemptOutcome::Success).await;

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::FullRandom { cause: FullRandomCause::Bootstrap });
    assert!(rec.next.is_none());
    assert_eq!(rec.coverage.mode_coverage_percent, 0.0);
}

#[tokio::test]
async fn test_fill_scenario_proposes_unsampled_target() {
    let h = Harness::new(common::abc_catalog(), settings(|e| e.min_samples_per_target = 3));
    h.record_n(B, 3, 2).await;
    h.record_n(C, 1, 4).await;

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Target);
    assert_eq!(rec.next_key(), Some(&key(A)));
    assert_eq!(rec.mode, Some(SelectionMode::Fill));
    assert_eq!(rec.selection_reason, Some(SelectionReason::Drawn));
    assert!((rec.coverage.mode_coverage_percent - 66.67).abs() < 1e-9);
    assert_eq!(rec.selected_seed, Some(100));
    assert!(rec.load_command.is_none());

    let state = h.state().await.unwrap();
    assert_eq!(state.streak.current_target_key, Some(key(A)));
    assert_eq!(state.streak.streak_count, 1);
}

#[tokio::test]
async fn test_weak_band_picks_lowest_success_rate() {
    let h = Harness::new(
        common::abc_catalog(),
        settings(|e| {
            e.mode_bands = vec![ModeBand::new(0.0, 0, 1, 0)];
            e.bootstrap_coverage_percent = 0.0;
        }),
    );
    h.record_n(A, 2, 0).await;
    h.record_n(B, 1, 1).await;
    h.record_n(C, 0, 2).await;

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.next_key(), Some(&key(C)));
    assert_eq!(rec.mode, Some(SelectionMode::Weak));
    assert_eq!(rec.next.as_ref().map(|n| n.success_rate), Some(0.0));
}

#[tokio::test]
async fn test_repeated_polls_keep_seed_until_new_attempt() {
    let h = Harness::new(common::abc_catalog(), settings(|e| e.min_samples_per_target = 3));
    h.record_n(B, 3, 2).await;
    h.record_n(C, 1, 4).await;

    let first = h.engine.poll(EvaluateRequest::default()).await.unwrap();
    let second = h.engine.poll(EvaluateRequest::default()).await.unwrap();
    assert_eq!(first.selected_seed, Some(100));
    assert_eq!(second.selected_seed, Some(100));

    h.record(A, AttemptOutcome::Fail).await;
    let third = h.engine.poll(EvaluateRequest::default()).await.unwrap();
    assert_eq!(third.next_key(), Some(&key(A)));
    assert_eq!(third.selected_seed, Some(200));
}

#[tokio::test]
async fn test_toggle_lock_is_idempotent_with_desired_state() {
    let h = harness();

    h.engine.toggle_lock(A, Some(true)).await.unwrap();
    let list = h.engine.toggle_lock(A, Some(true)).await.unwrap();
    assert_eq!(list.raw(), [A.to_string()].as_slice());

    let list = h.engine.toggle_lock(A, None).await.unwrap();
    assert!(list.is_empty());
    let list = h.engine.toggle_lock(A, Some(false)).await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_set_single_and_clear_locks() {
    let h = harness();
    h.engine.toggle_lock(A, Some(true)).await.unwrap();
    h.engine.toggle_lock(B, Some(true)).await.unwrap();

    let list = h.engine.set_single_lock(C).await.unwrap();
    assert_eq!(list.raw(), [C.to_string()].as_slice());

    let list = h.engine.clear_locks().await.unwrap();
    assert!(list.is_empty());
    assert!(h.engine.lock_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lock_list_restricts_selection() {
    let h = harness();
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;
    h.engine.set_single_lock(C).await.unwrap();

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Target);
    assert_eq!(rec.next_key(), Some(&key(C)));
    assert!(rec.lock_list_applied);
    assert_eq!(rec.lock_list, vec![key(C)]);
}

#[tokio::test]
async fn test_bootstrap_applies_with_lock_list() {
    let h = harness();
    h.record(A, AttemptOutcome::Success).await;
    h.engine.set_single_lock(A).await.unwrap();

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::FullRandom { cause: FullRandomCause::Bootstrap });
    assert!(rec.next.is_none());
    assert!(rec.lock_list_applied);
}

#[tokio::test]
async fn test_locked_targets_below_threshold_disable_recommendation() {
    let h = harness();
    h.record_n(A, 2, 0).await;
    h.engine.set_single_lock(B).await.unwrap();

    let request = EvaluateRequest::default().with_leniency_threshold(Some(1.0));
    let rec = h.engine.evaluate(request).await.unwrap();
    assert_eq!(
        rec.status,
        RecommendationStatus::Disabled { reason: DisabledReason::LockedTargetsIneligible }
    );
    assert!(rec.next.is_none());
}

#[tokio::test]
async fn test_persisted_threshold_filters_eligibility() {
    let h = harness();
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;

    assert_eq!(h.engine.set_leniency_threshold(Some(1.0)).await.unwrap(), Some(1.0));
    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.leniency_threshold, Some(1.0));
    assert_eq!(rec.coverage.eligible_targets, 2);
    assert_ne!(rec.next_key(), Some(&key(B)));

    assert_eq!(h.engine.set_leniency_threshold(None).await.unwrap(), None);
    let report = h.engine.coverage(EvaluateRequest::default()).await.unwrap();
    assert_eq!(report.snapshot.eligible_targets, 3);
}

#[tokio::test]
async fn test_streak_locks_after_min_evaluations() {
    let h = harness();
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;

    let mut last = None;
    for expected in 1..=3u32 {
        let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
        assert_eq!(rec.streak.streak_count, expected);
        last = Some(rec);
    }
    let last = last.unwrap();
    assert!(last.streak.lock_active);

    let held = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert!(held.lock_applied);
    assert_eq!(held.next_key(), last.next_key());
    assert!(!held.target_changed);
}

#[tokio::test]
async fn test_lock_holds_when_policy_prefers_another() {
    let h = Harness::new(
        common::abc_catalog(),
        settings(|e| {
            e.mode_bands = vec![ModeBand::new(0.0, 0, 1, 0)];
            e.bootstrap_coverage_percent = 0.0;
        }),
    );
    h.record_n(A, 2, 0).await;
    h.record_n(B, 1, 1).await;
    h.record_n(C, 0, 2).await;

    for _ in 0..3 {
        h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    }
    let state = h.state().await.unwrap();
    assert!(state.streak.lock_active);
    assert_eq!(state.streak.current_target_key, Some(key(C)));

    // C climbs to 33%, A drops to 25% and becomes the weakest.
    h.record(C, AttemptOutcome::Success).await;
    h.record_n(A, 0, 6).await;
    let report = h.engine.coverage(EvaluateRequest::default()).await.unwrap();
    let rate = |raw: &str| report.get(&key(raw)).map(|s| s.success_rate).unwrap();
    assert!(rate(A) < rate(C));

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.next_key(), Some(&key(C)));
    assert!(rec.lock_applied);
    assert_eq!(rec.selection_reason, Some(SelectionReason::StreakLock));
    assert_eq!(rec.streak.completion_streak, 1);
    assert!(!rec.target_changed);
}

#[tokio::test]
async fn test_skip_moves_off_locked_target() {
    let h = Harness::new(common::abc_catalog(), settings(|e| e.min_streak_to_swap = 2));
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;

    h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    let locked = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert!(locked.streak.lock_active);
    let skipped = locked.next_key().cloned().unwrap();

    let status = h.engine.skip_current_lock().await.unwrap();
    assert!(!status.lock_active);
    assert_eq!(status.streak_count, 0);

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Target);
    assert_ne!(rec.next_key(), Some(&skipped));
    assert!(rec.target_changed);
    assert_eq!(rec.streak.streak_count, 1);
}

#[tokio::test]
async fn test_lock_completion_forces_switch() {
    let h = Harness::new(common::abc_catalog(), settings(|e| e.min_streak_to_swap = 2));
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;

    h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    let locked = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    let locked_key = locked.next_key().cloned().unwrap();

    h.record_n(locked_key.as_str(), 2, 0).await;
    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert!(rec.lock_completed);
    assert!(rec.target_changed);
    assert_ne!(rec.next_key(), Some(&locked_key));
}

#[tokio::test]
async fn test_override_short_circuits_without_touching_state() {
    let h = harness();
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;
    h.engine.evaluate(EvaluateRequest::default()).await.unwrap();

    let outcome = h.engine.set_full_random_override(true).await.unwrap();
    assert!(outcome.effective);
    assert!(!outcome.forced);

    let before = h.state().await.unwrap();
    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::FullRandom { cause: FullRandomCause::Override });
    assert!(rec.next.is_none());
    assert_eq!(h.state().await.unwrap(), before);

    h.engine.set_full_random_override(false).await.unwrap();
    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Target);
}

#[tokio::test]
async fn test_legal_mode_forces_override_off() {
    let mut s = settings(|_| {});
    s.legal_mode = true;
    let h = Harness::new(common::abc_catalog(), s);
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;

    let outcome = h.engine.set_full_random_override(true).await.unwrap();
    assert!(outcome.forced);
    assert!(!outcome.effective);

    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Target);
    assert!(rec.override_state.legal_mode);
}

#[tokio::test]
async fn test_invalid_input_leaves_state_unchanged() {
    let h = harness();

    let err = h.engine.toggle_lock("mpk|A|Sideways|1", None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTargetKey { .. }));
    let err = h.engine.set_single_lock("").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTargetKey { .. }));
    let err = h.engine.set_leniency_threshold(Some(f64::NAN)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidThreshold { .. }));
    assert!(h.state().await.is_none());

    let request = EvaluateRequest::default().with_leniency_threshold(Some(-1.0));
    assert!(matches!(h.engine.evaluate(request).await, Err(EngineError::InvalidThreshold { .. })));
    assert!(matches!(h.engine.poll(request).await, Err(EngineError::InvalidThreshold { .. })));
    assert!(h.state().await.is_none());
}

#[tokio::test]
async fn test_empty_window_and_empty_catalog() {
    let h = harness();
    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Disabled { reason: DisabledReason::EmptyWindow });

    h.record(A, AttemptOutcome::Success).await;
    h.catalog.replace(TargetCatalog::default());
    let rec = h.engine.evaluate(EvaluateRequest::default()).await.unwrap();
    assert_eq!(rec.status, RecommendationStatus::Disabled { reason: DisabledReason::EmptyCatalog });
}

#[tokio::test]
async fn test_window_filter_bounds_attempts() {
    let h = harness();
    h.record_n(A, 2, 0).await;
    h.record_n(C, 2, 0).await;

    let rec = h.engine.evaluate(EvaluateRequest::new(WindowFilter::last_n(2))).await.unwrap();
    assert_eq!(rec.window_size, Some(2));
    assert_eq!(rec.coverage.window_attempts, 2);
}

#[tokio::test]
async fn test_upstream_failures_degrade_on_poll() {
    let h = harness();
    h.record_n(A, 2, 0).await;

    h.ledger.set_unavailable(true);
    assert!(matches!(
        h.engine.evaluate(EvaluateRequest::default()).await,
        Err(EngineError::LedgerUnavailable(_))
    ));
    let rec = h.engine.poll(EvaluateRequest::default()).await.unwrap();
    assert_eq!(
        rec.status,
        RecommendationStatus::Disabled { reason: DisabledReason::UpstreamUnavailable }
    );
    assert!(rec.detail.is_some());
    h.ledger.set_unavailable(false);

    h.catalog.set_unavailable(true);
    assert!(matches!(
        h.engine.evaluate(EvaluateRequest::default()).await,
        Err(EngineError::CatalogUnavailable(_))
    ));
    let rec = h.engine.poll(EvaluateRequest::default()).await.unwrap();
    assert_eq!(
        rec.status,
        RecommendationStatus::Disabled { reason: DisabledReason::UpstreamUnavailable }
    );
}

#[tokio::test]
async fn test_state_store_failure_is_reported() {
    let h = harness();
    h.states.set_unavailable(true);
    assert!(matches!(
        h.engine.toggle_lock(A, None).await,
        Err(EngineError::StateUnavailable(_))
    ));
}

#[tokio::test]
async fn test_mutation_reports_busy_while_barrier_held() {
    common::setup_test_logging();
    let gate = Arc::new(Gate::default());
    let states = Arc::new(GatedStateRepository {
        inner: Arc::new(InMemoryPracticeStateRepository::new()),
        gate: gate.clone(),
    });
    let engine = Arc::new(engine_with(
        Arc::new(StaticCatalogSource::new(common::abc_catalog())),
        Arc::new(InMemoryAttemptLedger::new()),
        states,
        settings(|e| e.mutation_timeout_ms = 50),
    ));

    gate.arm();
    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.toggle_lock(A, Some(true)).await })
    };
    gate.wait_entered().await;

    let err = engine.set_leniency_threshold(Some(1.0)).await.unwrap_err();
    assert!(matches!(err, EngineError::Busy));

    gate.release();
    let list = first.await.unwrap().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(engine.lock_list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_overtaken_evaluation_is_superseded() {
    common::setup_test_logging();
    let gate = Arc::new(Gate::default());
    let inner = Arc::new(InMemoryAttemptLedger::new());
    let ledger = Arc::new(GatedLedger { inner: inner.clone(), gate: gate.clone() });
    let states = Arc::new(InMemoryPracticeStateRepository::new());
    let engine = Arc::new(engine_with(
        Arc::new(StaticCatalogSource::new(common::abc_catalog())),
        ledger,
        states,
        settings(|_| {}),
    ));

    gate.arm();
    let stale = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.evaluate(EvaluateRequest::default()).await })
    };
    gate.wait_entered().await;

    let fresh = engine.evaluate(EvaluateRequest::default()).await;
    assert!(fresh.is_ok());

    gate.release();
    assert!(matches!(stale.await.unwrap(), Err(EngineError::Superseded)));
}

#[tokio::test]
async fn test_overtaken_poll_is_discarded() {
    common::setup_test_logging();
    let gate = Arc::new(Gate::default());
    let inner = Arc::new(InMemoryAttemptLedger::new());
    let ledger = Arc::new(GatedLedger { inner: inner.clone(), gate: gate.clone() });
    let states = Arc::new(InMemoryPracticeStateRepository::new());
    let engine = Arc::new(engine_with(
        Arc::new(StaticCatalogSource::new(common::abc_catalog())),
        ledger,
        states,
        settings(|_| {}),
    ));

    gate.arm();
    let stale = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.poll(EvaluateRequest::default()).await })
    };
    gate.wait_entered().await;

    let fresh = engine.poll(EvaluateRequest::default()).await.unwrap();
    assert_eq!(fresh.status, RecommendationStatus::Disabled { reason: DisabledReason::EmptyWindow });

    gate.release();
    assert!(matches!(stale.await.unwrap(), Err(EngineError::Superseded)));
}
