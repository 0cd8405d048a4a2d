//! In-memory adapters for tests and embedding.
//!
//! Each one can be switched to an unavailable mode where every call fails,
//! simulating an upstream outage.

pub mod attempt_ledger;
pub mod catalog;
pub mod practice_state_repository;

pub use attempt_ledger::InMemoryAttemptLedger;
pub use catalog::StaticCatalogSource;
pub use practice_state_repository::InMemoryPracticeStateRepository;
