//! Ports (interfaces) the practice engine depends on.

pub mod attempt_ledger;
pub mod practice_state_repository;
pub mod target_catalog;

pub use attempt_ledger::{AttemptLedger, AttemptRecorder};
pub use practice_state_repository::PracticeStateRepository;
pub use target_catalog::TargetCatalogSource;
