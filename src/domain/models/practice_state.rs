//! Persisted practice session state.
//!
//! One `PracticeState` exists per session key. It carries the automatic
//! streak/lock state, the user's lock list, the full-random override flag,
//! the leniency threshold and the seed rotation cursors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::selection::SelectionMode;
use super::target::{TargetCatalog, TargetKey};

/// Default streak length before the current target locks.
pub const DEFAULT_MIN_STREAK_TO_SWAP: u32 = 3;

/// Automatic streak/lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_target_key: Option<TargetKey>,
    pub current_selection_mode: Option<SelectionMode>,
    pub streak_count: u32,
    pub lock_active: bool,
    pub min_streak_to_swap: u32,
    /// Highest attempt id in the window when the lock engaged
    pub lock_anchor_attempt_id: Option<i64>,
    /// Target excluded from the next policy run
    pub pending_skip_key: Option<TargetKey>,
}

impl StreakState {
    pub fn new(min_streak_to_swap: u32) -> Self {
        Self {
            current_target_key: None,
            current_selection_mode: None,
            streak_count: 0,
            lock_active: false,
            min_streak_to_swap,
            lock_anchor_attempt_id: None,
            pending_skip_key: None,
        }
    }

    /// Drop the current target and any lock.
    pub fn clear_current(&mut self) {
        self.current_target_key = None;
        self.current_selection_mode = None;
        self.streak_count = 0;
        self.lock_active = false;
        self.lock_anchor_attempt_id = None;
    }

    pub fn weak_lock_active(&self) -> bool {
        self.lock_active && self.current_selection_mode == Some(SelectionMode::Weak)
    }
}

impl Default for StreakState {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_STREAK_TO_SWAP)
    }
}

/// User-pinned targets.
///
/// Entries are stored as canonical key strings in insertion order. They are
/// validated on write and normalized against the active catalog on read; stale
/// entries are never removed implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockList {
    keys: Vec<String>,
}

impl LockList {
    /// Rebuild from persisted strings, dropping duplicates. Entries that parse
    /// are compared as keys, the rest as strings.
    pub fn from_raw(keys: impl IntoIterator<Item = String>) -> Self {
        let mut list = Self::default();
        for raw in keys {
            let duplicate = match TargetKey::parse(&raw) {
                Ok(key) => list.contains(&key),
                Err(_) => list.keys.contains(&raw),
            };
            if !duplicate {
                list.keys.push(raw);
            }
        }
        list
    }

    pub fn raw(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn contains(&self, key: &TargetKey) -> bool {
        self.keys.iter().any(|raw| entry_matches(raw, key))
    }

    /// Add or remove a key. `desired` of `None` flips membership.
    /// Returns whether the key is a member afterwards.
    pub fn toggle(&mut self, key: &TargetKey, desired: Option<bool>) -> bool {
        let present = self.contains(key);
        let want = desired.unwrap_or(!present);
        if want && !present {
            self.keys.push(key.to_string());
        } else if !want && present {
            self.keys.retain(|raw| !entry_matches(raw, key));
        }
        want
    }

    pub fn set_single(&mut self, key: &TargetKey) {
        self.keys = vec![key.to_string()];
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Entries that parse, belong to the catalog's family and are present in
    /// it, deduplicated and sorted by canonical key.
    pub fn normalized(&self, catalog: &TargetCatalog) -> Vec<TargetKey> {
        let family = catalog.family();
        let set: BTreeSet<TargetKey> = self
            .keys
            .iter()
            .filter_map(|raw| TargetKey::parse(raw).ok())
            .filter(|key| family == Some(key.family()))
            .filter(|key| catalog.contains(key))
            .collect();
        set.into_iter().collect()
    }

    /// Entries that parse, ignoring the catalog.
    pub fn valid_keys(&self) -> Vec<TargetKey> {
        let set: BTreeSet<TargetKey> =
            self.keys.iter().filter_map(|raw| TargetKey::parse(raw).ok()).collect();
        set.into_iter().collect()
    }
}

/// A stored entry names `key` when it parses to the same canonical key.
fn entry_matches(raw: &str, key: &TargetKey) -> bool {
    raw == key.as_str() || TargetKey::parse(raw).is_ok_and(|parsed| &parsed == key)
}

/// Full-random override as requested by the user and as forced by legal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideState {
    /// Persisted user request
    pub requested: bool,
    /// External legal/ranked flag; forces the override off
    pub legal_mode: bool,
}

impl OverrideState {
    pub fn effective(&self) -> bool {
        self.requested && !self.legal_mode
    }
}

/// Result of a `SetFullRandomOverride` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideOutcome {
    pub state: OverrideState,
    pub effective: bool,
    /// The request was ignored because legal mode forces the override off
    pub forced: bool,
}

/// Seed rotation bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRotationState {
    /// Next seed index per target
    pub cursors: BTreeMap<TargetKey, usize>,
    pub selected_seed: Option<i64>,
    /// Highest attempt id observed when the seed was last chosen
    pub last_seen_attempt_id: Option<i64>,
}

/// Everything persisted for one practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeState {
    pub session_key: String,
    pub streak: StreakState,
    pub lock_list: LockList,
    pub full_random_override: bool,
    pub leniency_threshold: Option<f64>,
    pub seeds: SeedRotationState,
    pub updated_at: DateTime<Utc>,
}

impl PracticeState {
    pub fn new(session_key: impl Into<String>, min_streak_to_swap: u32) -> Self {
        Self {
            session_key: session_key.into(),
            streak: StreakState::new(min_streak_to_swap),
            lock_list: LockList::default(),
            full_random_override: false,
            leniency_threshold: None,
            seeds: SeedRotationState::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn override_state(&self, legal_mode: bool) -> OverrideState {
        OverrideState { requested: self.full_random_override, legal_mode }
    }
}
