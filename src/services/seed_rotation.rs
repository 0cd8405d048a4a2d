//! Per-target world seed rotation.

use crate::domain::models::{SeedRotationState, Target};

/// Choose the seed to report for the proposed target.
///
/// The seed advances to the target's next seed when the proposed key changed,
/// when an attempt newer than the last observed one appears, or when no valid
/// seed is selected yet. Otherwise the current seed is kept so repeated polls
/// report the same seed.
pub fn select_seed(
    state: &mut SeedRotationState,
    target: Option<&Target>,
    key_changed: bool,
    window_max_id: Option<i64>,
) -> Option<i64> {
    let new_attempt = match (window_max_id, state.last_seen_attempt_id) {
        (Some(max), Some(seen)) => max > seen,
        (Some(_), None) => true,
        (None, _) => false,
    };
    state.last_seen_attempt_id = window_max_id.max(state.last_seen_attempt_id);

    let Some(target) = target.filter(|t| !t.seeds.is_empty()) else {
        state.selected_seed = None;
        return None;
    };

    let stale = state.selected_seed.is_none_or(|seed| !target.seeds.contains(&seed));
    if key_changed || new_attempt || stale {
        let cursor = state.cursors.entry(target.key.clone()).or_insert(0);
        let idx = *cursor % target.seeds.len();
        state.selected_seed = Some(target.seeds[idx]);
        *cursor = idx + 1;
    }
    state.selected_seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TargetKey;

    fn target(seeds: Vec<i64>) -> Target {
        Target::new(TargetKey::parse("mpk|M-85|Front|3").unwrap()).with_seeds(seeds)
    }

    #[test]
    fn test_first_selection_uses_first_seed() {
        let mut state = SeedRotationState::default();
        let t = target(vec![11, 22, 33]);
        assert_eq!(select_seed(&mut state, Some(&t), true, Some(1)), Some(11));
    }

    #[test]
    fn test_repeated_poll_keeps_seed() {
        let mut state = SeedRotationState::default();
        let t = target(vec![11, 22, 33]);
        select_seed(&mut state, Some(&t), true, Some(1));
        assert_eq!(select_seed(&mut state, Some(&t), false, Some(1)), Some(11));
    }

    #[test]
    fn test_new_attempt_advances_and_wraps() {
        let mut state = SeedRotationState::default();
        let t = target(vec![11, 22]);
        assert_eq!(select_seed(&mut state, Some(&t), true, Some(1)), Some(11));
        assert_eq!(select_seed(&mut state, Some(&t), false, Some(2)), Some(22));
        assert_eq!(select_seed(&mut state, Some(&t), false, Some(3)), Some(11));
    }

    #[test]
    fn test_target_without_seeds_clears_selection() {
        let mut state = SeedRotationState::default();
        let t = target(vec![11]);
        select_seed(&mut state, Some(&t), true, Some(1));
        assert_eq!(select_seed(&mut state, Some(&target(vec![])), true, Some(1)), None);
        assert_eq!(select_seed(&mut state, None, true, Some(1)), None);
        assert_eq!(state.last_seen_attempt_id, Some(1));
    }
}
