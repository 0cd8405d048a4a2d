//! CLI command implementations.

pub mod attempt;
pub mod init;
pub mod leniency;
pub mod lock;
pub mod override_cmd;
pub mod recommend;
pub mod skip;
pub mod targets;
pub mod watch;
