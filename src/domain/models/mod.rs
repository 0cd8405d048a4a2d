//! Domain models for zero-coach.

pub mod attempt;
pub mod config;
pub mod coverage;
pub mod practice_state;
pub mod recommendation;
pub mod selection;
pub mod target;

pub use attempt::{Attempt, AttemptOutcome, NewAttempt, SeedMode, WindowFilter, WindowSpan, DEFAULT_WINDOW_SIZE};
pub use config::{CatalogConfig, CatalogSourceKind, Config, DatabaseConfig, EngineConfig, LoggingConfig};
pub use coverage::{CoverageSnapshot, HeightStats, TargetStats};
pub use practice_state::{
    LockList, OverrideOutcome, OverrideState, PracticeState, SeedRotationState, StreakState,
    DEFAULT_MIN_STREAK_TO_SWAP,
};
pub use recommendation::{
    DisabledReason, FullRandomCause, Recommendation, RecommendationStatus, StreakStatus,
};
pub use selection::{
    default_mode_bands, ModeBand, SelectionMode, SelectionOutcome, SelectionPick, SelectionReason,
};
pub use target::{
    CatalogError, Rotation, Side, Target, TargetCatalog, TargetFamily, TargetKey, TargetKeyError,
    TargetKind, TargetVariant,
};
