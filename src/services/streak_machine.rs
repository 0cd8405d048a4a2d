//! Streak/lock state machine.
//!
//! `UNLOCKED` re-runs the selection policy every evaluation. Once the same
//! target has been proposed `min_streak_to_swap` times in a row the machine
//! moves to `LOCKED` and keeps that target until the player lands
//! `min_streak_to_swap` consecutive successes on it, it leaves the candidate
//! scope, or the user skips it.

use crate::domain::models::{Attempt, AttemptOutcome, SelectionMode, SelectionPick, StreakState, TargetKey};

/// Result of checking an active lock before the policy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockCheck {
    /// No lock is active
    Unlocked,
    /// Keep proposing the locked target
    Hold { completion_streak: u32 },
    /// Completion reached; the locked target is excluded from this run
    Completed { completion_streak: u32 },
    /// The locked target left the candidate scope
    Released,
}

#[derive(Debug, Clone, Copy)]
pub struct StreakMachine {
    min_streak_to_swap: u32,
}

impl StreakMachine {
    pub fn new(min_streak_to_swap: u32) -> Self {
        Self { min_streak_to_swap: min_streak_to_swap.max(1) }
    }

    pub fn min_streak_to_swap(&self) -> u32 {
        self.min_streak_to_swap
    }

    /// Consecutive successes on `key`, newest first, among attempts after
    /// the anchor id.
    pub fn completion_streak(key: &TargetKey, anchor: Option<i64>, attempts: &[Attempt]) -> u32 {
        let floor = anchor.unwrap_or(i64::MIN);
        let mut on_target: Vec<&Attempt> = attempts
            .iter()
            .filter(|a| a.id > floor && a.outcome.is_scored())
            .filter(|a| a.parsed_key().as_ref() == Some(key))
            .collect();
        on_target.sort_by_key(|a| std::cmp::Reverse(a.id));

        let streak = on_target
            .iter()
            .take_while(|a| a.outcome == AttemptOutcome::Success)
            .count();
        u32::try_from(streak).unwrap_or(u32::MAX)
    }

    pub fn check_lock(&self, state: &StreakState, in_scope: bool, attempts: &[Attempt]) -> LockCheck {
        let Some(key) = state.current_target_key.as_ref().filter(|_| state.lock_active) else {
            return LockCheck::Unlocked;
        };
        if !in_scope {
            return LockCheck::Released;
        }
        let completion_streak = Self::completion_streak(key, state.lock_anchor_attempt_id, attempts);
        if completion_streak >= self.min_streak_to_swap {
            LockCheck::Completed { completion_streak }
        } else {
            LockCheck::Hold { completion_streak }
        }
    }

    /// Keep the locked target for another evaluation.
    pub fn hold(&self, state: &mut StreakState) {
        state.min_streak_to_swap = self.min_streak_to_swap;
        state.streak_count = state.streak_count.saturating_add(1);
    }

    /// Apply a fresh policy pick.
    ///
    /// `force_switch` treats the pick as a new target even when the key
    /// matches, used after a lock completes on the only candidate.
    pub fn apply_pick(
        &self,
        state: &mut StreakState,
        pick: &SelectionPick,
        force_switch: bool,
        window_max_id: Option<i64>,
    ) {
        state.min_streak_to_swap = self.min_streak_to_swap;
        let same = state.current_target_key.as_ref() == Some(&pick.key);

        if same && !force_switch {
            state.streak_count = state.streak_count.saturating_add(1);
        } else {
            state.current_target_key = Some(pick.key.clone());
            state.streak_count = 1;
            state.lock_active = false;
            state.lock_anchor_attempt_id = None;
        }
        state.current_selection_mode = Some(pick.mode);

        if !state.lock_active && state.streak_count >= self.min_streak_to_swap {
            state.lock_active = true;
            state.lock_anchor_attempt_id = window_max_id;
            tracing::info!(
                target_key = %pick.key,
                mode = pick.mode.as_str(),
                anchor = ?window_max_id,
                "target locked"
            );
        }
    }

    /// Drop the current target (bootstrap and no-recommendation outcomes).
    pub fn clear(&self, state: &mut StreakState) {
        state.min_streak_to_swap = self.min_streak_to_swap;
        state.clear_current();
    }

    /// User skip: unlock, zero the streak and exclude the target once.
    pub fn skip(&self, state: &mut StreakState) {
        state.pending_skip_key = state.current_target_key.clone();
        state.streak_count = 0;
        state.lock_active = false;
        state.lock_anchor_attempt_id = None;
    }

    /// `(key, mode)` pair used for change detection.
    pub fn pair(state: &StreakState) -> Option<(TargetKey, Option<SelectionMode>)> {
        state
            .current_target_key
            .clone()
            .map(|key| (key, state.current_selection_mode))
    }
}
