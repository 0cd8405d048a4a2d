//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::TargetStats;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self { use_colors: supports_color(), max_width: None }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self { use_colors, max_width }
    }

    /// Per-target statistics; rows below `min_points` attempts are marked
    /// unsampled.
    pub fn format_targets(&self, stats: &[TargetStats], min_points: u32) -> String {
        let mut table = self.create_base_table();
        table.set_header(
            ["Target", "Key", "Attempts", "Successes", "Rate", "Leniency", "Eligible", "Sampled"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

        for s in stats {
            let sampled = s.is_sampled(min_points);
            let rate = if s.attempts == 0 { "-".to_string() } else { format!("{:.2}%", s.success_rate) };
            let leniency = s.leniency.map_or_else(|| "-".to_string(), |l| format!("{l:.3}"));

            let rate_cell = if self.use_colors && s.attempts > 0 {
                Cell::new(rate).fg(rate_color(s.success_rate))
            } else {
                Cell::new(rate)
            };
            let eligible_cell = if self.use_colors {
                Cell::new(if s.eligible { "yes" } else { "no" })
                    .fg(if s.eligible { Color::Green } else { Color::DarkGrey })
            } else {
                Cell::new(if s.eligible { "yes" } else { "no" })
            };

            table.add_row(vec![
                Cell::new(&s.label),
                Cell::new(s.key.as_str()),
                Cell::new(s.attempts),
                Cell::new(s.successes),
                rate_cell,
                Cell::new(leniency),
                eligible_cell,
                Cell::new(if sampled { "yes" } else { "no" }),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

fn rate_color(rate: f64) -> Color {
    if rate >= 75.0 {
        Color::Green
    } else if rate >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
