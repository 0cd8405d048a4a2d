//! `zero-coach recommend`: evaluate once and print the result.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{format_percent, output, yes_no, CommandOutput};
use crate::domain::models::{
    Config, Recommendation, RecommendationStatus, SeedMode, WindowFilter, DEFAULT_WINDOW_SIZE,
};
use crate::services::EvaluateRequest;

/// Window and threshold flags shared by the evaluating commands.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Use the N most recent scored attempts
    #[arg(long, conflicts_with_all = ["all", "since"])]
    pub last: Option<usize>,

    /// Use every scored attempt
    #[arg(long, conflicts_with = "since")]
    pub all: bool,

    /// Use attempts recorded at or after this RFC3339 timestamp
    #[arg(long)]
    pub since: Option<String>,

    /// Only count attempts of this seed mode (set_seed, full_random)
    #[arg(long)]
    pub seed_mode: Option<String>,

    /// Leniency threshold for this call only
    #[arg(long)]
    pub leniency: Option<f64>,
}

impl WindowArgs {
    /// Build the evaluation request, defaulting to the configured window size.
    pub fn to_request(&self, config: &Config) -> Result<EvaluateRequest> {
        let mut filter = if self.all {
            WindowFilter::all()
        } else if let Some(raw) = &self.since {
            let since = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --since timestamp: {raw}"))?
                .with_timezone(&Utc);
            WindowFilter::since(since)
        } else {
            let size = self.last.unwrap_or(config.engine.window_size);
            WindowFilter::last_n(if size == 0 { DEFAULT_WINDOW_SIZE } else { size })
        };

        if let Some(raw) = &self.seed_mode {
            let mode = SeedMode::from_str(raw).ok_or_else(|| anyhow::anyhow!("Invalid seed mode: {raw}"))?;
            filter = filter.with_seed_mode(mode);
        }

        Ok(EvaluateRequest::new(filter).with_leniency_threshold(self.leniency))
    }
}

#[derive(Args, Debug)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct RecommendationOutput {
    pub recommendation: Recommendation,
}

impl CommandOutput for RecommendationOutput {
    fn to_human(&self) -> String {
        let r = &self.recommendation;
        let mut lines = Vec::new();

        match r.status {
            RecommendationStatus::Target => {
                if let Some(next) = &r.next {
                    let mode = r.mode.map_or("-", |m| m.as_str());
                    lines.push(format!("Next: {}  [{}]", next.label, mode));
                    lines.push(format!("  key: {}", next.key));
                    lines.push(format!(
                        "  window: {} attempt(s), {} success(es), rate {}",
                        next.attempts,
                        next.successes,
                        format_percent((next.attempts > 0).then_some(next.success_rate))
                    ));
                }
                if let Some(command) = &r.load_command {
                    lines.push(format!("  load: {command}"));
                }
                if let Some(seed) = r.selected_seed {
                    lines.push(format!("  seed: {seed}"));
                }
            }
            RecommendationStatus::FullRandom { cause } => {
                lines.push(format!("Full random ({})", cause.as_str()));
            }
            RecommendationStatus::Disabled { reason } => {
                lines.push(format!("No recommendation ({})", reason.as_str()));
                if let Some(detail) = &r.detail {
                    lines.push(format!("  {detail}"));
                }
            }
        }

        let c = &r.coverage;
        lines.push(format!(
            "Coverage: {} attempted ({}/{}), {} sampled ({}/{} eligible, min {} pts), sufficient: {}",
            format_percent(Some(c.coverage_percent)),
            c.qualified_targets,
            c.total_targets,
            format_percent(Some(c.mode_coverage_percent)),
            c.mode_qualified_targets,
            c.mode_total_targets,
            c.min_points_per_target,
            yes_no(c.is_sufficient),
        ));
        if !c.missing_towers.is_empty() {
            lines.push(format!("Missing towers: {}", c.missing_towers.join(", ")));
        }

        let s = &r.streak;
        let mut streak = format!("Streak: {}/{}", s.streak_count, s.min_streak_to_swap);
        if s.lock_active {
            streak.push_str(&format!(" locked ({} clean)", s.completion_streak));
        }
        if r.lock_completed {
            streak.push_str(", lock completed");
        }
        lines.push(streak);

        if !r.lock_list.is_empty() {
            lines.push(format!(
                "Lock list: {} target(s){}",
                r.lock_list.len(),
                if r.lock_list_applied { " (applied)" } else { "" }
            ));
        }
        if r.override_state.requested {
            let note = if r.override_state.effective() { "on" } else { "requested, forced off by legal mode" };
            lines.push(format!("Full-random override: {note}"));
        }
        if let Some(threshold) = r.leniency_threshold {
            lines.push(format!("Leniency threshold: {threshold}"));
        }
        if r.target_changed {
            lines.push("Target changed.".to_string());
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RecommendArgs, config: Config, json_mode: bool) -> Result<()> {
    let request = args.window.to_request(&config)?;
    let ctx = AppContext::open(config).await?;
    let recommendation = ctx.engine.poll(request).await?;
    output(&RecommendationOutput { recommendation }, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::WindowSpan;

    #[test]
    fn test_window_args_default_uses_config_size() {
        let mut config = Config::default();
        config.engine.window_size = 40;
        let request = WindowArgs::default().to_request(&config).unwrap();
        assert_eq!(request.filter.span, WindowSpan::LastN(40));
        assert_eq!(request.leniency_threshold, None);
    }

    #[test]
    fn test_window_args_since_and_seed_mode() {
        let args = WindowArgs {
            since: Some("2026-01-02T03:04:05Z".to_string()),
            seed_mode: Some("full_random".to_string()),
            leniency: Some(0.5),
            ..WindowArgs::default()
        };
        let request = args.to_request(&Config::default()).unwrap();
        assert!(matches!(request.filter.span, WindowSpan::Since(_)));
        assert_eq!(request.filter.seed_mode, Some(SeedMode::FullRandom));
        assert_eq!(request.leniency_threshold, Some(0.5));
    }

    #[test]
    fn test_window_args_rejects_bad_input() {
        let bad_since = WindowArgs { since: Some("yesterday".to_string()), ..WindowArgs::default() };
        assert!(bad_since.to_request(&Config::default()).is_err());
        let bad_mode = WindowArgs { seed_mode: Some("random".to_string()), ..WindowArgs::default() };
        assert!(bad_mode.to_request(&Config::default()).is_err());
    }
}
