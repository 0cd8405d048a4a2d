//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;
pub mod table;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::attempt::AttemptArgs;
use commands::init::InitArgs;
use commands::leniency::LeniencyArgs;
use commands::lock::LockArgs;
use commands::override_cmd::OverrideArgs;
use commands::recommend::RecommendArgs;
use commands::targets::TargetsArgs;
use commands::watch::WatchArgs;

pub use context::AppContext;

#[derive(Parser, Debug)]
#[command(name = "zero-coach")]
#[command(about = "Practice target recommendations for zero-cycle practice", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .zero-coach/
    #[arg(short, long, global = true, env = "ZERO_COACH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and a default config file
    Init(InitArgs),
    /// Evaluate once and print the recommendation
    Recommend(RecommendArgs),
    /// Poll and print whenever the proposed target changes
    Watch(WatchArgs),
    /// Manage the lock list
    Lock(LockArgs),
    /// Turn the full-random override on or off
    Override(OverrideArgs),
    /// Unlock the current target and move on
    Skip,
    /// Set or clear the leniency threshold
    Leniency(LeniencyArgs),
    /// Record or list attempts
    Attempt(AttemptArgs),
    /// Per-target statistics for the window
    Targets(TargetsArgs),
}

/// Print a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
