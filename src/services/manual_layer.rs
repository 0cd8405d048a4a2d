//! Manual layer: the user's lock list and the full-random override.
//!
//! Evaluated before the selection policy. The override short-circuits to "no
//! managed target"; a non-empty lock list narrows the candidate scope to its
//! eligible members.

use crate::domain::models::{OverrideOutcome, PracticeState, TargetCatalog, TargetKey, TargetStats};
use crate::services::coverage_calculator::CoverageReport;

/// Candidates the policy may choose from.
#[derive(Debug, Clone)]
pub struct CandidateScope<'a> {
    pub candidates: Vec<&'a TargetStats>,
    /// Selection is restricted to the lock list
    pub lock_list_applied: bool,
}

impl CandidateScope<'_> {
    pub fn contains(&self, key: &TargetKey) -> bool {
        self.candidates.iter().any(|c| &c.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ManualLayer {
    legal_mode: bool,
}

impl ManualLayer {
    pub fn new(legal_mode: bool) -> Self {
        Self { legal_mode }
    }

    pub fn legal_mode(&self) -> bool {
        self.legal_mode
    }

    pub fn override_effective(&self, state: &PracticeState) -> bool {
        state.override_state(self.legal_mode).effective()
    }

    /// Lock list entries usable with this catalog.
    pub fn normalized_lock_list(&self, state: &PracticeState, catalog: &TargetCatalog) -> Vec<TargetKey> {
        state.lock_list.normalized(catalog)
    }

    /// Eligible candidates, restricted to the lock list when it has usable
    /// entries.
    ///
    /// A lock list whose entries are all stale counts as empty; a lock list
    /// with usable but ineligible entries yields an empty scope.
    pub fn scope<'a>(&self, report: &'a CoverageReport, lock_list: &[TargetKey]) -> CandidateScope<'a> {
        if lock_list.is_empty() {
            return CandidateScope { candidates: report.eligible().collect(), lock_list_applied: false };
        }
        let candidates = lock_list
            .iter()
            .filter_map(|key| report.get(key))
            .filter(|stats| stats.eligible)
            .collect();
        CandidateScope { candidates, lock_list_applied: true }
    }

    /// Persist the override request unless legal mode forces it off.
    pub fn set_override(&self, state: &mut PracticeState, enabled: bool) -> OverrideOutcome {
        let forced = enabled && self.legal_mode;
        if !forced {
            state.full_random_override = enabled;
        }
        let override_state = state.override_state(self.legal_mode);
        OverrideOutcome { state: override_state, effective: override_state.effective(), forced }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Attempt, AttemptOutcome, SeedMode, Target};
    use crate::services::coverage_calculator::CoverageCalculator;
    use chrono::Utc;

    fn key(raw: &str) -> TargetKey {
        TargetKey::parse(raw).unwrap()
    }

    fn report(threshold: Option<f64>) -> CoverageReport {
        let catalog = TargetCatalog::new(vec![
            Target::new(key("mpk|A|Front|1")).with_leniency(2.0),
            Target::new(key("mpk|B|Front|1")).with_leniency(0.1),
            Target::new(key("mpk|C|Front|1")).with_leniency(3.0),
        ])
        .unwrap();
        let attempts = vec![Attempt {
            id: 1,
            target_key: "mpk|A|Front|1".to_string(),
            outcome: AttemptOutcome::Success,
            seed_mode: SeedMode::SetSeed,
            standing_height: None,
            seed: None,
            recorded_at: Utc::now(),
        }];
        CoverageCalculator::new(2, 80.0).calculate(&catalog, &attempts, threshold)
    }

    #[test]
    fn test_scope_without_lock_list_is_all_eligible() {
        let report = report(Some(1.0));
        let scope = ManualLayer::new(false).scope(&report, &[]);
        assert!(!scope.lock_list_applied);
        assert_eq!(scope.candidates.len(), 2);
    }

    #[test]
    fn test_scope_restricts_to_lock_list() {
        let report = report(Some(1.0));
        let scope = ManualLayer::new(false).scope(&report, &[key("mpk|C|Front|1")]);
        assert!(scope.lock_list_applied);
        assert_eq!(scope.candidates.len(), 1);
        assert!(scope.contains(&key("mpk|C|Front|1")));
    }

    #[test]
    fn test_scope_with_ineligible_lock_is_empty() {
        let report = report(Some(1.0));
        let scope = ManualLayer::new(false).scope(&report, &[key("mpk|B|Front|1")]);
        assert!(scope.lock_list_applied);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_override_forced_in_legal_mode() {
        let mut state = PracticeState::new("default", 3);
        let outcome = ManualLayer::new(true).set_override(&mut state, true);
        assert!(outcome.forced);
        assert!(!outcome.effective);
        assert!(!state.full_random_override);

        let outcome = ManualLayer::new(true).set_override(&mut state, false);
        assert!(!outcome.forced);
    }

    #[test]
    fn test_override_toggles_outside_legal_mode() {
        let mut state = PracticeState::new("default", 3);
        let layer = ManualLayer::new(false);
        assert!(layer.set_override(&mut state, true).effective);
        assert!(layer.override_effective(&state));
        assert!(!layer.set_override(&mut state, false).effective);
    }
}
