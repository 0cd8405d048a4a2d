//! Attempt domain model.
//!
//! Attempts are owned by the ledger and are read-only to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::TargetKey;

/// Default practice window: the most recent scored attempts.
pub const DEFAULT_WINDOW_SIZE: usize = 250;

/// Outcome of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Fail,
    /// Abandoned before the outcome was known
    Reset,
    /// Still running
    InProgress,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Reset => "reset",
            Self::InProgress => "in_progress",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "success" => Some(Self::Success),
            "fail" | "failure" => Some(Self::Fail),
            "reset" => Some(Self::Reset),
            "in_progress" => Some(Self::InProgress),
            _ => None,
        }
    }

    /// Only successes and fails count toward statistics.
    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Success | Self::Fail)
    }
}

/// How the world seed was chosen for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    #[default]
    SetSeed,
    FullRandom,
}

impl SeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetSeed => "set_seed",
            Self::FullRandom => "full_random",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "set_seed" => Some(Self::SetSeed),
            "full_random" => Some(Self::FullRandom),
            _ => None,
        }
    }
}

/// A recorded attempt.
///
/// `target_key` is kept as the raw ledger string; keys that do not parse or
/// are not in the active catalog are ignored during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Monotonic ledger id
    pub id: i64,
    pub target_key: String,
    pub outcome: AttemptOutcome,
    pub seed_mode: SeedMode,
    pub standing_height: Option<i32>,
    pub seed: Option<i64>,
    pub recorded_at: DateTime<Utc>,
}

impl Attempt {
    pub fn parsed_key(&self) -> Option<TargetKey> {
        TargetKey::parse(&self.target_key).ok()
    }
}

/// Attempt to be appended to the ledger.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub target_key: TargetKey,
    pub outcome: AttemptOutcome,
    pub seed_mode: SeedMode,
    pub standing_height: Option<i32>,
    pub seed: Option<i64>,
    pub recorded_at: DateTime<Utc>,
}

impl NewAttempt {
    pub fn new(target_key: TargetKey, outcome: AttemptOutcome) -> Self {
        Self {
            target_key,
            outcome,
            seed_mode: SeedMode::SetSeed,
            standing_height: None,
            seed: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_standing_height(mut self, standing_height: i32) -> Self {
        self.standing_height = Some(standing_height);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seed_mode(mut self, seed_mode: SeedMode) -> Self {
        self.seed_mode = seed_mode;
        self
    }

    pub fn recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}

/// Which part of the ledger history is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum WindowSpan {
    /// The N most recent scored attempts
    LastN(usize),
    /// Scored attempts recorded at or after the timestamp
    Since(DateTime<Utc>),
    All,
}

/// Window scoping for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFilter {
    pub span: WindowSpan,
    /// Restrict to one seed mode
    pub seed_mode: Option<SeedMode>,
}

impl WindowFilter {
    pub fn last_n(n: usize) -> Self {
        Self { span: WindowSpan::LastN(n), seed_mode: None }
    }

    pub fn since(since: DateTime<Utc>) -> Self {
        Self { span: WindowSpan::Since(since), seed_mode: None }
    }

    pub fn all() -> Self {
        Self { span: WindowSpan::All, seed_mode: None }
    }

    pub fn with_seed_mode(mut self, seed_mode: SeedMode) -> Self {
        self.seed_mode = Some(seed_mode);
        self
    }

    /// Nominal window size reported back to callers.
    pub fn size_hint(&self) -> Option<usize> {
        match self.span {
            WindowSpan::LastN(n) => Some(n),
            WindowSpan::Since(_) | WindowSpan::All => None,
        }
    }

    /// Apply the filter to an id-ordered slice of attempts.
    ///
    /// Used by adapters that hold attempts in memory; the SQLite ledger
    /// expresses the same rules in SQL.
    pub fn apply(&self, attempts: &[Attempt]) -> Vec<Attempt> {
        let mut selected: Vec<Attempt> = attempts
            .iter()
            .filter(|a| a.outcome.is_scored())
            .filter(|a| self.seed_mode.is_none_or(|mode| a.seed_mode == mode))
            .filter(|a| match self.span {
                WindowSpan::Since(since) => a.recorded_at >= since,
                WindowSpan::LastN(_) | WindowSpan::All => true,
            })
            .cloned()
            .collect();
        selected.sort_by_key(|a| a.id);

        if let WindowSpan::LastN(n) = self.span {
            let skip = selected.len().saturating_sub(n);
            selected.drain(..skip);
        }
        selected
    }
}

impl Default for WindowFilter {
    fn default() -> Self {
        Self::last_n(DEFAULT_WINDOW_SIZE)
    }
}
