//! `zero-coach override`: the full-random override.

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, OverrideOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct OverrideArgs {
    /// on or off
    #[arg(value_enum)]
    pub state: Switch,
}

#[derive(Debug, serde::Serialize)]
pub struct OverrideOutput {
    pub requested: bool,
    pub legal_mode: bool,
    pub effective: bool,
    pub forced: bool,
}

impl From<OverrideOutcome> for OverrideOutput {
    fn from(outcome: OverrideOutcome) -> Self {
        Self {
            requested: outcome.state.requested,
            legal_mode: outcome.state.legal_mode,
            effective: outcome.effective,
            forced: outcome.forced,
        }
    }
}

impl CommandOutput for OverrideOutput {
    fn to_human(&self) -> String {
        if self.forced {
            return "Legal mode is on; the full-random override stays off.".to_string();
        }
        if self.effective {
            "Full-random override on.".to_string()
        } else {
            "Full-random override off.".to_string()
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: OverrideArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let outcome = ctx.engine.set_full_random_override(args.state == Switch::On).await?;
    output(&OverrideOutput::from(outcome), json_mode);
    Ok(())
}
