//! Selection policy.
//!
//! Draws a selection mode from coverage-banded weights and picks the
//! top-ranked candidate of that mode's pool. Empty pools fall back through
//! Fill, Weak, Maintain in that order.

use rand::Rng;
use std::cmp::Ordering;

use crate::domain::models::{
    default_mode_bands, EngineConfig, ModeBand, SelectionMode, SelectionOutcome, SelectionPick,
    SelectionReason, TargetKey, TargetStats,
};

/// Inputs for one policy run.
#[derive(Debug, Clone)]
pub struct SelectionInput<'a> {
    /// Eligible candidates in scope
    pub candidates: Vec<&'a TargetStats>,
    /// Sample-sufficiency coverage of the scope, used for the band
    pub sample_coverage: f64,
    /// Catalog-wide sample-sufficiency coverage checked by the bootstrap gate
    pub gate_coverage: f64,
    /// Key to leave out unless it is the only candidate
    pub exclude: Option<&'a TargetKey>,
}

/// Coverage-banded, weighted selection policy.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    bands: Vec<ModeBand>,
    bootstrap_coverage_percent: f64,
    min_points_per_target: u32,
    maintain_min_success_percent: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SelectionPolicy {
    pub fn new(
        mut bands: Vec<ModeBand>,
        bootstrap_coverage_percent: f64,
        min_points_per_target: u32,
        maintain_min_success_percent: f64,
    ) -> Self {
        if bands.is_empty() {
            bands = default_mode_bands();
        }
        bands.sort_by(|a, b| a.min_coverage_percent.total_cmp(&b.min_coverage_percent));
        Self { bands, bootstrap_coverage_percent, min_points_per_target, maintain_min_success_percent }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.mode_bands.clone(),
            config.bootstrap_coverage_percent,
            config.min_samples_per_target,
            config.maintain_min_success_percent,
        )
    }

    /// Coverage below the bootstrap threshold proposes full random.
    pub fn bootstrap_applies(&self, coverage: f64) -> bool {
        coverage < self.bootstrap_coverage_percent
    }

    /// Highest band whose lower bound is at or below `coverage`, else the lowest.
    pub fn band_for(&self, coverage: f64) -> ModeBand {
        self.bands
            .iter()
            .rev()
            .find(|band| band.min_coverage_percent <= coverage)
            .or_else(|| self.bands.first())
            .copied()
            .unwrap_or_else(|| ModeBand::new(0.0, 1, 0, 0))
    }

    pub fn decide<R: Rng + ?Sized>(&self, input: &SelectionInput<'_>, rng: &mut R) -> SelectionOutcome {
        if self.bootstrap_applies(input.gate_coverage) {
            return SelectionOutcome::FullRandom;
        }

        let mut candidates: Vec<&TargetStats> = input.candidates.clone();
        if let Some(excluded) = input.exclude {
            if candidates.len() > 1 {
                candidates.retain(|c| &c.key != excluded);
            }
        }
        if candidates.is_empty() {
            return SelectionOutcome::Empty;
        }

        let band = self.band_for(input.sample_coverage);
        let requested = draw_mode(&band, rng).unwrap_or(SelectionMode::Fill);

        if let Some(stats) = self.top_of_pool(requested, &candidates) {
            return SelectionOutcome::Pick(SelectionPick {
                key: stats.key.clone(),
                mode: requested,
                requested_mode: requested,
                reason: SelectionReason::Drawn,
            });
        }

        for mode in SelectionMode::FALLBACK_ORDER.into_iter().filter(|m| *m != requested) {
            if let Some(stats) = self.top_of_pool(mode, &candidates) {
                tracing::debug!(
                    requested = requested.as_str(),
                    used = mode.as_str(),
                    "drawn mode pool empty, falling back"
                );
                return SelectionOutcome::Pick(SelectionPick {
                    key: stats.key.clone(),
                    mode,
                    requested_mode: requested,
                    reason: SelectionReason::Fallback,
                });
            }
        }

        SelectionOutcome::FullRandom
    }

    /// Candidates belonging to a mode's pool, ranked best first.
    pub fn pool<'a>(&self, mode: SelectionMode, candidates: &[&'a TargetStats]) -> Vec<&'a TargetStats> {
        let min = self.min_points_per_target;
        let mut pool: Vec<&TargetStats> = candidates
            .iter()
            .copied()
            .filter(|s| match mode {
                SelectionMode::Fill => !s.is_sampled(min),
                SelectionMode::Weak => s.is_sampled(min),
                SelectionMode::Maintain => {
                    s.is_sampled(min) && s.success_rate >= self.maintain_min_success_percent
                }
            })
            .collect();
        pool.sort_by(|a, b| rank(mode, a, b));
        pool
    }

    fn top_of_pool<'a>(&self, mode: SelectionMode, candidates: &[&'a TargetStats]) -> Option<&'a TargetStats> {
        self.pool(mode, candidates).into_iter().next()
    }
}

/// Weighted draw over the band's mode weights.
pub fn draw_mode<R: Rng + ?Sized>(band: &ModeBand, rng: &mut R) -> Option<SelectionMode> {
    let total_weight = band.total_weight();
    if total_weight == 0 {
        return None;
    }
    let roll = rng.gen_range(0..total_weight);
    mode_for_roll(band, roll)
}

/// Map a roll in `0..total_weight` to a mode by cumulative weight.
pub fn mode_for_roll(band: &ModeBand, roll: u32) -> Option<SelectionMode> {
    let mut cursor = 0;
    for (mode, weight) in band.weights() {
        cursor += weight;
        if roll < cursor {
            return Some(mode);
        }
    }
    None
}

fn rank(mode: SelectionMode, a: &TargetStats, b: &TargetStats) -> Ordering {
    match mode {
        SelectionMode::Fill => a.attempts.cmp(&b.attempts).then_with(|| a.key.cmp(&b.key)),
        SelectionMode::Weak => a
            .success_rate
            .total_cmp(&b.success_rate)
            .then_with(|| a.attempts.cmp(&b.attempts))
            .then_with(|| a.key.cmp(&b.key)),
        SelectionMode::Maintain => b
            .success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| a.attempts.cmp(&b.attempts))
            .then_with(|| a.key.cmp(&b.key)),
    }
}
