//! Per-target statistics and the coverage snapshot.
//!
//! Both are derived from the attempt window on every evaluation and are never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::TargetKey;

/// Round a percentage to two decimals.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage in `[0, 100]`; a zero denominator yields 0.
#[allow(clippy::cast_precision_loss)]
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_percent((part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0))
}

/// Statistics for one standing height of a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightStats {
    pub standing_height: i32,
    pub attempts: u32,
    pub successes: u32,
    pub success_rate: f64,
    pub leniency: Option<f64>,
}

/// Statistics for one catalog target over the active window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStats {
    pub key: TargetKey,
    pub label: String,
    pub attempts: u32,
    pub successes: u32,
    /// Success rate in percent, rounded to two decimals
    pub success_rate: f64,
    pub leniency: Option<f64>,
    pub eligible: bool,
    pub by_standing_height: Vec<HeightStats>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_attempt_id: Option<i64>,
}

impl TargetStats {
    pub fn is_sampled(&self, min_points: u32) -> bool {
        self.attempts >= min_points
    }
}

/// Coverage summary over the active window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    /// Share of all targets with at least one scored attempt
    pub coverage_percent: f64,
    pub qualified_targets: usize,
    pub total_targets: usize,
    pub min_points_per_target: u32,
    pub threshold_percent: f64,
    /// Display-only flag: `mode_coverage_percent >= threshold_percent`
    pub is_sufficient: bool,
    pub eligible_targets: usize,
    /// Share of eligible targets meeting `min_points_per_target`
    pub mode_coverage_percent: f64,
    pub mode_qualified_targets: usize,
    pub mode_total_targets: usize,
    pub max_leniency: Option<f64>,
    /// Scored attempts in the window that matched a catalog target
    pub window_attempts: usize,
    /// Catalog towers with no attempt in the window
    pub missing_towers: Vec<String>,
}

impl CoverageSnapshot {
    /// Snapshot for responses produced without reading any data.
    pub fn empty(min_points_per_target: u32, threshold_percent: f64) -> Self {
        Self {
            coverage_percent: 0.0,
            qualified_targets: 0,
            total_targets: 0,
            min_points_per_target,
            threshold_percent,
            is_sufficient: false,
            eligible_targets: 0,
            mode_coverage_percent: 0.0,
            mode_qualified_targets: 0,
            mode_total_targets: 0,
            max_leniency: None,
            window_attempts: 0,
            missing_towers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        assert!((percent(2, 3) - 66.67).abs() < f64::EPSILON);
        assert!((percent(1, 3) - 33.33).abs() < f64::EPSILON);
        assert!((percent(3, 3) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_zero_denominator() {
        assert!(percent(0, 0).abs() < f64::EPSILON);
        assert!(percent(5, 0).abs() < f64::EPSILON);
    }
}
