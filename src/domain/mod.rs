//! Domain layer for zero-coach
//!
//! This module contains the practice models, the ports the engine reads
//! through, and the error types shared by both.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, EngineError, EngineResult};
