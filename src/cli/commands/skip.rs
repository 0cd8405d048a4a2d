//! `zero-coach skip`: release the current lock.

use anyhow::Result;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, StreakStatus};

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct SkipOutput {
    pub streak: StreakStatus,
}

impl CommandOutput for SkipOutput {
    fn to_human(&self) -> String {
        "Skipped; the current target will not be proposed next.".to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let streak = ctx.engine.skip_current_lock().await?;
    output(&SkipOutput { streak }, json_mode);
    Ok(())
}
