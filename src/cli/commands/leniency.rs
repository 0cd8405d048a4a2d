//! `zero-coach leniency`: the persisted eligibility cutoff.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct LeniencyArgs {
    #[command(subcommand)]
    pub command: LeniencyCommands,
}

#[derive(Subcommand, Debug)]
pub enum LeniencyCommands {
    /// Only targets with leniency above this value are eligible
    Set {
        value: f64,
    },
    /// Make every target eligible again
    Clear,
}

#[derive(Debug, serde::Serialize)]
pub struct LeniencyOutput {
    pub leniency_threshold: Option<f64>,
}

impl CommandOutput for LeniencyOutput {
    fn to_human(&self) -> String {
        match self.leniency_threshold {
            Some(value) => format!("Leniency threshold set to {value}."),
            None => "Leniency threshold cleared.".to_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: LeniencyArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let value = match args.command {
        LeniencyCommands::Set { value } => Some(value),
        LeniencyCommands::Clear => None,
    };
    let leniency_threshold = ctx.engine.set_leniency_threshold(value).await?;
    output(&LeniencyOutput { leniency_threshold }, json_mode);
    Ok(())
}
