//! Adapters implementing the domain ports.

pub mod catalog;
pub mod memory;
pub mod sqlite;
