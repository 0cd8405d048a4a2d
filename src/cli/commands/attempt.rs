//! `zero-coach attempt`: feed the ledger.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Attempt, AttemptOutcome, Config, NewAttempt, SeedMode, TargetKey};
use crate::domain::ports::AttemptRecorder;

#[derive(Args, Debug)]
pub struct AttemptArgs {
    #[command(subcommand)]
    pub command: AttemptCommands,
}

#[derive(Subcommand, Debug)]
pub enum AttemptCommands {
    /// Record one attempt
    Record {
        /// Target key, e.g. "mpk|M-85|Front|3"
        key: String,
        /// success, fail, reset or in_progress
        outcome: String,
        /// Standing height the attempt was made from
        #[arg(long)]
        standing_height: Option<i32>,
        /// World seed
        #[arg(long, allow_negative_numbers = true)]
        seed: Option<i64>,
        /// The attempt was made on a fully random world
        #[arg(long)]
        full_random: bool,
    },
    /// Show the most recent attempts
    List {
        /// Maximum number of attempts to display
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct RecordOutput {
    pub id: i64,
    pub target_key: String,
    pub outcome: AttemptOutcome,
}

impl CommandOutput for RecordOutput {
    fn to_human(&self) -> String {
        format!("Recorded attempt #{} on {} ({}).", self.id, self.target_key, self.outcome.as_str())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AttemptListOutput {
    pub attempts: Vec<Attempt>,
    pub total: usize,
}

impl CommandOutput for AttemptListOutput {
    fn to_human(&self) -> String {
        if self.attempts.is_empty() {
            return "No attempts recorded.".to_string();
        }
        let mut lines = vec![format!("{:<8} {:<28} {:<12} {:<12} {}", "ID", "TARGET", "OUTCOME", "SEED MODE", "RECORDED")];
        lines.push("-".repeat(88));
        for a in &self.attempts {
            lines.push(format!(
                "{:<8} {:<28} {:<12} {:<12} {}",
                a.id,
                a.target_key,
                a.outcome.as_str(),
                a.seed_mode.as_str(),
                a.recorded_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Validate the raw arguments into a ledger entry.
pub fn new_attempt(
    key: &str,
    outcome: &str,
    standing_height: Option<i32>,
    seed: Option<i64>,
    full_random: bool,
) -> Result<NewAttempt> {
    let key = TargetKey::parse(key).with_context(|| format!("Invalid target key: {key}"))?;
    let outcome = AttemptOutcome::from_str(outcome).ok_or_else(|| anyhow::anyhow!("Invalid outcome: {outcome}"))?;

    let mut attempt = NewAttempt::new(key, outcome);
    if let Some(height) = standing_height {
        attempt = attempt.with_standing_height(height);
    }
    if let Some(seed) = seed {
        attempt = attempt.with_seed(seed);
    }
    if full_random {
        attempt = attempt.with_seed_mode(SeedMode::FullRandom);
    }
    Ok(attempt)
}

pub async fn execute(args: AttemptArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    match args.command {
        AttemptCommands::Record { key, outcome, standing_height, seed, full_random } => {
            let attempt = new_attempt(&key, &outcome, standing_height, seed, full_random)?;
            let id = ctx.ledger.record(&attempt).await.context("Failed to record attempt")?;
            let out = RecordOutput { id, target_key: attempt.target_key.to_string(), outcome: attempt.outcome };
            output(&out, json_mode);
        }
        AttemptCommands::List { limit } => {
            let attempts = ctx.ledger.recent(limit).await.context("Failed to list attempts")?;
            output(&AttemptListOutput { total: attempts.len(), attempts }, json_mode);
        }
    }
    Ok(())
}
