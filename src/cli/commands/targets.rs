//! `zero-coach targets`: per-target statistics.

use anyhow::Result;
use clap::Args;

use super::recommend::WindowArgs;
use crate::cli::context::AppContext;
use crate::cli::output::{format_percent, output, CommandOutput};
use crate::cli::table::TableFormatter;
use crate::domain::models::{Config, CoverageSnapshot, TargetStats};

#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Only show eligible targets
    #[arg(long)]
    pub eligible: bool,

    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Debug, serde::Serialize)]
pub struct TargetsOutput {
    pub coverage: CoverageSnapshot,
    pub targets: Vec<TargetStats>,
}

impl CommandOutput for TargetsOutput {
    fn to_human(&self) -> String {
        let c = &self.coverage;
        let table = TableFormatter::new().format_targets(&self.targets, c.min_points_per_target);
        format!(
            "{table}\n{} of {} targets attempted, {} of eligible sampled",
            c.qualified_targets,
            c.total_targets,
            format_percent(Some(c.mode_coverage_percent))
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: TargetsArgs, config: Config, json_mode: bool) -> Result<()> {
    let request = args.window.to_request(&config)?;
    let ctx = AppContext::open(config).await?;
    let report = ctx.engine.coverage(request).await?;

    let targets = if args.eligible { report.eligible().cloned().collect() } else { report.stats };
    output(&TargetsOutput { coverage: report.snapshot, targets }, json_mode);
    Ok(())
}
