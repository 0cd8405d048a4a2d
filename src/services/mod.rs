//! Services: the practice recommendation pipeline and the engine that
//! drives it.

pub mod coverage_calculator;
pub mod manual_layer;
pub mod practice_engine;
pub mod recommendation_assembler;
pub mod seed_rotation;
pub mod selection_policy;
pub mod streak_machine;

pub use coverage_calculator::{CoverageCalculator, CoverageReport};
pub use manual_layer::{CandidateScope, ManualLayer};
pub use practice_engine::{validate_threshold, EngineSettings, EvaluateRequest, PracticeEngine};
pub use recommendation_assembler::{assemble, Assembly, AssemblyInput};
pub use seed_rotation::select_seed;
pub use selection_policy::{draw_mode, SelectionInput, SelectionPolicy};
pub use streak_machine::{LockCheck, StreakMachine};
