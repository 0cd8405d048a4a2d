//! The assembled recommendation returned by every evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coverage::{CoverageSnapshot, TargetStats};
use super::practice_state::{OverrideState, StreakState};
use super::selection::{SelectionMode, SelectionReason};
use super::target::TargetKey;

/// Why no managed target is proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullRandomCause {
    /// The user's full-random override
    Override,
    /// Sample coverage is below the bootstrap threshold
    Bootstrap,
    /// Every mode pool was empty
    EmptyPools,
}

impl FullRandomCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Bootstrap => "bootstrap",
            Self::EmptyPools => "empty_pools",
        }
    }
}

/// Why the engine produced no recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledReason {
    EmptyCatalog,
    EmptyWindow,
    NoEligibleTargets,
    LockedTargetsIneligible,
    UpstreamUnavailable,
}

impl DisabledReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyCatalog => "empty_catalog",
            Self::EmptyWindow => "empty_window",
            Self::NoEligibleTargets => "no_eligible_targets",
            Self::LockedTargetsIneligible => "locked_targets_ineligible",
            Self::UpstreamUnavailable => "upstream_unavailable",
        }
    }
}

/// Top-level outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RecommendationStatus {
    Target,
    FullRandom { cause: FullRandomCause },
    Disabled { reason: DisabledReason },
}

impl RecommendationStatus {
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target)
    }
}

/// Streak/lock status exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStatus {
    pub streak_count: u32,
    pub min_streak_to_swap: u32,
    pub lock_active: bool,
    pub weak_lock_active: bool,
    /// Consecutive successes on the locked target since the lock engaged
    pub completion_streak: u32,
}

impl StreakStatus {
    pub fn from_state(state: &StreakState, completion_streak: u32) -> Self {
        Self {
            streak_count: state.streak_count,
            min_streak_to_swap: state.min_streak_to_swap,
            lock_active: state.lock_active,
            weak_lock_active: state.weak_lock_active(),
            completion_streak,
        }
    }
}

/// One immutable evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub status: RecommendationStatus,
    pub coverage: CoverageSnapshot,
    /// Target that was current before this evaluation
    pub current: Option<TargetStats>,
    /// Proposed target
    pub next: Option<TargetStats>,
    pub mode: Option<SelectionMode>,
    pub requested_mode: Option<SelectionMode>,
    pub selection_reason: Option<SelectionReason>,
    pub streak: StreakStatus,
    /// The streak lock kept the current target this evaluation
    pub lock_applied: bool,
    /// Selection was restricted to the user's lock list
    pub lock_list_applied: bool,
    pub target_changed: bool,
    pub lock_completed: bool,
    pub lock_list: Vec<TargetKey>,
    pub override_state: OverrideState,
    pub leniency_threshold: Option<f64>,
    pub selected_seed: Option<i64>,
    pub load_command: Option<String>,
    pub window_size: Option<usize>,
    /// Extra context for disabled responses
    pub detail: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn next_key(&self) -> Option<&TargetKey> {
        self.next.as_ref().map(|stats| &stats.key)
    }
}
