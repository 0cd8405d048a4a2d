//! Coverage calculator.
//!
//! Turns the attempt window and the catalog into per-target statistics and a
//! coverage snapshot. Two coverage figures are produced: attempted-at-all
//! over every target, and sample sufficiency over eligible targets only.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::models::coverage::{percent, round_percent};
use crate::domain::models::{
    Attempt, AttemptOutcome, CoverageSnapshot, HeightStats, TargetCatalog, TargetKey, TargetStats,
};

/// Statistics for every catalog target plus the snapshot derived from them.
#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub snapshot: CoverageSnapshot,
    /// One entry per catalog target, in canonical key order
    pub stats: Vec<TargetStats>,
}

impl CoverageReport {
    pub fn get(&self, key: &TargetKey) -> Option<&TargetStats> {
        self.stats
            .binary_search_by(|s| s.key.cmp(key))
            .ok()
            .and_then(|idx| self.stats.get(idx))
    }

    pub fn eligible(&self) -> impl Iterator<Item = &TargetStats> {
        self.stats.iter().filter(|s| s.eligible)
    }
}

#[derive(Default)]
struct Tally {
    attempts: u32,
    successes: u32,
    last_attempt_at: Option<chrono::DateTime<chrono::Utc>>,
    last_attempt_id: Option<i64>,
    heights: BTreeMap<i32, (u32, u32)>,
}

/// Computes coverage for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CoverageCalculator {
    min_points_per_target: u32,
    threshold_percent: f64,
}

impl CoverageCalculator {
    pub fn new(min_points_per_target: u32, threshold_percent: f64) -> Self {
        Self { min_points_per_target, threshold_percent }
    }

    pub fn min_points_per_target(&self) -> u32 {
        self.min_points_per_target
    }

    /// Whether a target passes the leniency gate.
    ///
    /// With a threshold set, the leniency must exist and be strictly greater.
    pub fn is_eligible(leniency: Option<f64>, threshold: Option<f64>) -> bool {
        match threshold {
            None => true,
            Some(t) => leniency.is_some_and(|l| l > t),
        }
    }

    pub fn calculate(
        &self,
        catalog: &TargetCatalog,
        attempts: &[Attempt],
        leniency_threshold: Option<f64>,
    ) -> CoverageReport {
        let mut tallies: HashMap<TargetKey, Tally> = HashMap::new();
        let mut window_attempts = 0usize;

        for attempt in attempts.iter().filter(|a| a.outcome.is_scored()) {
            let Some(key) = attempt.parsed_key() else {
                continue;
            };
            if !catalog.contains(&key) {
                continue;
            }
            window_attempts += 1;

            let tally = tallies.entry(key).or_default();
            let success = attempt.outcome == AttemptOutcome::Success;
            tally.attempts += 1;
            if success {
                tally.successes += 1;
            }
            if tally.last_attempt_at.is_none_or(|at| attempt.recorded_at >= at) {
                tally.last_attempt_at = Some(attempt.recorded_at);
            }
            if tally.last_attempt_id.is_none_or(|id| attempt.id > id) {
                tally.last_attempt_id = Some(attempt.id);
            }
            if let Some(height) = attempt.standing_height {
                let entry = tally.heights.entry(height).or_insert((0, 0));
                entry.0 += 1;
                if success {
                    entry.1 += 1;
                }
            }
        }

        let mut stats = Vec::with_capacity(catalog.len());
        let mut attempted_towers = BTreeSet::new();
        for target in catalog.iter() {
            let tally = tallies.remove(&target.key).unwrap_or_default();
            if tally.attempts > 0 {
                attempted_towers.insert(target.key.tower_name().to_string());
            }

            let by_standing_height = tally
                .heights
                .iter()
                .map(|(&standing_height, &(attempts, successes))| HeightStats {
                    standing_height,
                    attempts,
                    successes,
                    success_rate: success_rate(successes, attempts),
                    leniency: target.leniency_by_standing_height.get(&standing_height).copied(),
                })
                .collect();

            stats.push(TargetStats {
                key: target.key.clone(),
                label: target.label.clone(),
                attempts: tally.attempts,
                successes: tally.successes,
                success_rate: success_rate(tally.successes, tally.attempts),
                leniency: target.leniency,
                eligible: Self::is_eligible(target.leniency, leniency_threshold),
                by_standing_height,
                last_attempt_at: tally.last_attempt_at,
                last_attempt_id: tally.last_attempt_id,
            });
        }

        let total_targets = stats.len();
        let qualified_targets = stats.iter().filter(|s| s.attempts > 0).count();
        let eligible: Vec<&TargetStats> = stats.iter().filter(|s| s.eligible).collect();
        let mode_total_targets = eligible.len();
        let mode_qualified_targets = eligible
            .iter()
            .filter(|s| s.is_sampled(self.min_points_per_target))
            .count();
        let mode_coverage_percent = percent(mode_qualified_targets, mode_total_targets);

        let max_leniency = catalog
            .iter()
            .filter_map(|t| t.leniency)
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |m| m.max(l))));

        let missing_towers = catalog
            .towers()
            .into_iter()
            .filter(|tower| !attempted_towers.contains(tower))
            .collect();

        let snapshot = CoverageSnapshot {
            coverage_percent: percent(qualified_targets, total_targets),
            qualified_targets,
            total_targets,
            min_points_per_target: self.min_points_per_target,
            threshold_percent: self.threshold_percent,
            is_sufficient: mode_coverage_percent >= self.threshold_percent,
            eligible_targets: mode_total_targets,
            mode_coverage_percent,
            mode_qualified_targets,
            mode_total_targets,
            max_leniency,
            window_attempts,
            missing_towers,
        };

        CoverageReport { snapshot, stats }
    }

    /// Sample coverage over an arbitrary candidate scope.
    pub fn sample_coverage<'a>(&self, scope: impl IntoIterator<Item = &'a TargetStats>) -> f64 {
        let (sampled, total) = scope.into_iter().fold((0, 0), |(sampled, total), s| {
            (sampled + usize::from(s.is_sampled(self.min_points_per_target)), total + 1)
        });
        percent(sampled, total)
    }
}

fn success_rate(successes: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    round_percent(f64::from(successes) / f64::from(attempts) * 100.0)
}
