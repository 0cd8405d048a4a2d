use chrono::Utc;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use zero_coach::domain::models::{EngineConfig, FullRandomCause, PracticeState, RecommendationStatus, SeedMode};
use zero_coach::services::{assemble, AssemblyInput, CoverageCalculator};
use zero_coach::{Attempt, AttemptOutcome, Target, TargetCatalog, TargetKey, WindowFilter};

fn catalog(size: usize) -> TargetCatalog {
    TargetCatalog::new((0..size).map(|i| {
        let key = TargetKey::parse(&format!("mpk|T-{i}|Front|1")).unwrap();
        Target::new(key).with_leniency(i as f64 / 4.0)
    }))
    .unwrap()
}

fn attempts(size: usize, raw: &[(usize, u8)]) -> Vec<Attempt> {
    raw.iter()
        .enumerate()
        .map(|(i, (target, outcome))| Attempt {
            id: i as i64 + 1,
            target_key: format!("mpk|T-{}|Front|1", target % size),
            outcome: match outcome % 4 {
                0 => AttemptOutcome::Success,
                1 => AttemptOutcome::Fail,
                2 => AttemptOutcome::Reset,
                _ => AttemptOutcome::InProgress,
            },
            seed_mode: SeedMode::SetSeed,
            standing_height: None,
            seed: None,
            recorded_at: Utc::now(),
        })
        .collect()
}

proptest! {
    /// Property: per-target statistics stay consistent for any window
    #[test]
    fn prop_coverage_statistics_are_bounded(
        size in 1usize..12,
        raw in prop::collection::vec((0usize..12, 0u8..4), 0..60),
        min_points in 1u32..5,
        threshold in prop::option::of(0.0f64..3.0),
    ) {
        let catalog = catalog(size);
        let attempts = attempts(size, &raw);
        let report = CoverageCalculator::new(min_points, 80.0).calculate(&catalog, &attempts, threshold);

        prop_assert_eq!(report.stats.len(), size);
        for stats in &report.stats {
            prop_assert!(stats.successes <= stats.attempts);
            prop_assert!((0.0..=100.0).contains(&stats.success_rate));
        }
        let snapshot = &report.snapshot;
        prop_assert!((0.0..=100.0).contains(&snapshot.coverage_percent));
        prop_assert!((0.0..=100.0).contains(&snapshot.mode_coverage_percent));
        prop_assert!(snapshot.eligible_targets <= snapshot.total_targets);
        prop_assert!(snapshot.mode_qualified_targets <= snapshot.mode_total_targets);
        let scored = attempts.iter().filter(|a| a.outcome.is_scored()).count();
        prop_assert!(snapshot.window_attempts <= scored);
    }

    /// Property: with a lock list in force the proposal is one of its members
    #[test]
    fn prop_pick_respects_lock_list(
        size in 2usize..10,
        raw in prop::collection::vec((0usize..10, 0u8..2), 1..40),
        locked in prop::collection::btree_set(0usize..10, 1..4),
        seed in any::<u64>(),
    ) {
        let catalog = catalog(size);
        let attempts = attempts(size, &raw);
        let mut state = PracticeState::new("prop", 3);
        let locked: Vec<TargetKey> = locked
            .into_iter()
            .map(|i| TargetKey::parse(&format!("mpk|T-{}|Front|1", i % size)).unwrap())
            .collect();
        for key in &locked {
            state.lock_list.toggle(key, Some(true));
        }

        let config = EngineConfig::default();
        let filter = WindowFilter::default();
        let input = AssemblyInput {
            catalog: &catalog,
            attempts: &attempts,
            filter: &filter,
            leniency_threshold: None,
            legal_mode: false,
            config: &config,
            now: Utc::now(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..4 {
            let out = assemble(&input, &state, &mut rng);
            prop_assert!(out.recommendation.lock_list_applied);
            if out.recommendation.coverage.mode_coverage_percent < config.bootstrap_coverage_percent {
                prop_assert_eq!(
                    out.recommendation.status,
                    RecommendationStatus::FullRandom { cause: FullRandomCause::Bootstrap }
                );
                prop_assert!(out.recommendation.next.is_none());
            } else {
                prop_assert_eq!(out.recommendation.status, RecommendationStatus::Target);
                let next = out.recommendation.next_key().cloned();
                prop_assert!(next.is_some_and(|k| locked.contains(&k)));
            }
            state = out.state;
        }
    }
}
