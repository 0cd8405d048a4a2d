//! Selection modes, coverage bands and the policy's pick.

use serde::{Deserialize, Serialize};

use super::target::TargetKey;

/// Selection mode used to choose a concrete target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Explore undersampled targets
    Fill,
    /// Drill the weakest sampled targets
    Weak,
    /// Revisit strong targets
    Maintain,
}

impl SelectionMode {
    /// Fallback order when the drawn mode has no candidates.
    pub const FALLBACK_ORDER: [Self; 3] = [Self::Fill, Self::Weak, Self::Maintain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Weak => "weak",
            Self::Maintain => "maintain",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fill" => Some(Self::Fill),
            "weak" => Some(Self::Weak),
            "maintain" => Some(Self::Maintain),
            _ => None,
        }
    }
}

/// Mode weights for coverage at or above `min_coverage_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeBand {
    pub min_coverage_percent: f64,
    pub fill: u32,
    pub weak: u32,
    pub maintain: u32,
}

impl ModeBand {
    pub const fn new(min_coverage_percent: f64, fill: u32, weak: u32, maintain: u32) -> Self {
        Self { min_coverage_percent, fill, weak, maintain }
    }

    pub fn weight(&self, mode: SelectionMode) -> u32 {
        match mode {
            SelectionMode::Fill => self.fill,
            SelectionMode::Weak => self.weak,
            SelectionMode::Maintain => self.maintain,
        }
    }

    pub fn total_weight(&self) -> u32 {
        self.fill + self.weak + self.maintain
    }

    pub fn weights(&self) -> [(SelectionMode, u32); 3] {
        [
            (SelectionMode::Fill, self.fill),
            (SelectionMode::Weak, self.weak),
            (SelectionMode::Maintain, self.maintain),
        ]
    }
}

/// Default coverage band table.
pub fn default_mode_bands() -> Vec<ModeBand> {
    vec![
        ModeBand::new(25.0, 90, 10, 0),
        ModeBand::new(50.0, 50, 30, 20),
        ModeBand::new(80.0, 30, 50, 20),
        ModeBand::new(95.0, 10, 50, 40),
    ]
}

/// Why a target was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// The drawn mode had candidates
    Drawn,
    /// The drawn mode was empty and a fallback mode was used
    Fallback,
    /// The streak lock kept the current target
    StreakLock,
}

impl SelectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drawn => "drawn",
            Self::Fallback => "fallback",
            Self::StreakLock => "streak_lock",
        }
    }
}

/// A concrete proposal from the selection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPick {
    pub key: TargetKey,
    /// Mode whose pool produced the pick
    pub mode: SelectionMode,
    /// Mode drawn from the band weights
    pub requested_mode: SelectionMode,
    pub reason: SelectionReason,
}

/// Outcome of one policy run.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Pick(SelectionPick),
    /// Bootstrap gate or every pool empty: no managed target
    FullRandom,
    /// No candidates at all
    Empty,
}
