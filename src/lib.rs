//! zero-coach - practice target recommendations for zero-cycle practice
//!
//! Given a catalog of practice targets and a ledger of attempts, the engine
//! computes coverage, picks the next target through a coverage-banded
//! selection policy, holds a target under a streak lock and honors the
//! user's lock list and full-random override.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the ports the engine reads through
//! - **Service Layer** (`services`): coverage, selection, streak and assembly logic
//! - **Adapters** (`adapters`): SQLite, file-backed and in-memory port implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zero_coach::adapters::memory::{InMemoryAttemptLedger, InMemoryPracticeStateRepository, StaticCatalogSource};
//! use zero_coach::{EngineSettings, EvaluateRequest, PracticeEngine, TargetCatalog};
//!
//! let engine = PracticeEngine::new(
//!     Arc::new(StaticCatalogSource::new(TargetCatalog::practice_map())),
//!     Arc::new(InMemoryAttemptLedger::new()),
//!     Arc::new(InMemoryPracticeStateRepository::new()),
//!     EngineSettings::default(),
//! );
//! let recommendation = engine.poll(EvaluateRequest::default()).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult, EngineError, EngineResult};
pub use domain::models::{
    Attempt, AttemptOutcome, Config, NewAttempt, Recommendation, RecommendationStatus, SeedMode,
    Target, TargetCatalog, TargetKey, WindowFilter,
};
pub use domain::ports::{AttemptLedger, AttemptRecorder, PracticeStateRepository, TargetCatalogSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EngineSettings, EvaluateRequest, PracticeEngine};
