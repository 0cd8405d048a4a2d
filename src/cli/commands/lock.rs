//! `zero-coach lock`: manage the lock list.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, LockList};

#[derive(Args, Debug)]
pub struct LockArgs {
    #[command(subcommand)]
    pub command: LockCommands,
}

#[derive(Subcommand, Debug)]
pub enum LockCommands {
    /// Show the lock list
    List,
    /// Add or remove a target key (toggles without --on/--off)
    Toggle {
        /// Target key, e.g. "tower|T-100|Back|CW"
        key: String,
        /// Make sure the key is in the list
        #[arg(long, conflicts_with = "off")]
        on: bool,
        /// Make sure the key is not in the list
        #[arg(long)]
        off: bool,
    },
    /// Replace the lock list with one key
    Set {
        /// Target key
        key: String,
    },
    /// Empty the lock list
    Clear,
}

#[derive(Debug, serde::Serialize)]
pub struct LockListOutput {
    pub keys: Vec<String>,
    pub total: usize,
}

impl From<&LockList> for LockListOutput {
    fn from(list: &LockList) -> Self {
        Self { keys: list.raw().to_vec(), total: list.len() }
    }
}

impl CommandOutput for LockListOutput {
    fn to_human(&self) -> String {
        if self.keys.is_empty() {
            return "Lock list is empty.".to_string();
        }
        let mut lines = vec![format!("Lock list ({} target(s)):", self.total)];
        lines.extend(self.keys.iter().map(|k| format!("  - {k}")));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn desired_state(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

pub async fn execute(args: LockArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let list = match args.command {
        LockCommands::List => ctx.engine.lock_list().await?,
        LockCommands::Toggle { key, on, off } => ctx.engine.toggle_lock(&key, desired_state(on, off)).await?,
        LockCommands::Set { key } => ctx.engine.set_single_lock(&key).await?,
        LockCommands::Clear => ctx.engine.clear_locks().await?,
    };
    output(&LockListOutput::from(&list), json_mode);
    Ok(())
}
