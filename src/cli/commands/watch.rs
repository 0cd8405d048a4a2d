//! `zero-coach watch`: poll on an interval and print on target changes.

use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tracing::{debug, info};

use super::recommend::{RecommendationOutput, WindowArgs};
use crate::cli::context::AppContext;
use crate::cli::output::output;
use crate::domain::models::{Config, Recommendation};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Poll interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Stop after this many polls
    #[arg(long)]
    pub max_polls: Option<u64>,

    /// Print every poll, not only changes
    #[arg(long)]
    pub verbose: bool,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Whether a poll result is worth printing.
fn should_print(previous: Option<&Recommendation>, current: &Recommendation, verbose: bool) -> bool {
    verbose
        || current.target_changed
        || previous.is_none_or(|p| p.status != current.status || p.next_key() != current.next_key())
}

pub async fn execute(args: WatchArgs, config: Config, json_mode: bool) -> Result<()> {
    let request = args.window.to_request(&config)?;
    let ctx = AppContext::open(config).await?;

    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(50)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut previous: Option<Recommendation> = None;
    let mut polls = 0u64;

    info!(interval_ms = args.interval_ms, "watching for target changes");
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
        }

        let recommendation = ctx.engine.poll(request).await?;
        if should_print(previous.as_ref(), &recommendation, args.verbose) {
            output(&RecommendationOutput { recommendation: recommendation.clone() }, json_mode);
        }
        previous = Some(recommendation);

        polls += 1;
        if args.max_polls.is_some_and(|max| polls >= max) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        CoverageSnapshot, DisabledReason, OverrideState, RecommendationStatus, StreakState, StreakStatus,
    };
    use chrono::Utc;

    fn disabled() -> Recommendation {
        Recommendation {
            status: RecommendationStatus::Disabled { reason: DisabledReason::EmptyWindow },
            coverage: CoverageSnapshot::empty(2, 80.0),
            current: None,
            next: None,
            mode: None,
            requested_mode: None,
            selection_reason: None,
            streak: StreakStatus::from_state(&StreakState::new(3), 0),
            lock_applied: false,
            lock_list_applied: false,
            target_changed: false,
            lock_completed: false,
            lock_list: vec![],
            override_state: OverrideState { requested: false, legal_mode: false },
            leniency_threshold: None,
            selected_seed: None,
            load_command: None,
            window_size: Some(250),
            detail: None,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_should_print_first_and_changes_only() {
        let first = disabled();
        assert!(should_print(None, &first, false));
        assert!(!should_print(Some(&first), &disabled(), false));
        assert!(should_print(Some(&first), &disabled(), true));

        let mut changed = disabled();
        changed.target_changed = true;
        assert!(should_print(Some(&first), &changed, false));
    }
}
