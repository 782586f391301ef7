//! Table output formatting for CLI commands
//!
//! Renders scan reports with comfy-table. Colors are dropped when `NO_COLOR`
//! is set or the terminal is dumb.

use std::env;

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

use crate::domain::models::UnitReport;

const RECOMMENDATION_WIDTH: usize = 60;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Formatter that colors when the terminal allows it.
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Formatter with explicit color and width settings.
    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per unit with failures.
    pub fn format_reports(&self, reports: &[UnitReport]) -> String {
        let mut table = self.create_base_table();
        table.set_header(
            ["Namespace", "Pod", "Container", "Failures", "Recommendation"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

        for report in reports {
            let failures = report
                .failures
                .strip_prefix("Failures: ")
                .unwrap_or(&report.failures);
            let failures_cell = if self.use_colors {
                Cell::new(failures).fg(Color::Red)
            } else {
                Cell::new(failures)
            };
            table.add_row(vec![
                Cell::new(&report.namespace),
                Cell::new(&report.pod_name),
                Cell::new(&report.container_name),
                failures_cell,
                Cell::new(truncate_text(&report.recommendation, RECOMMENDATION_WIDTH)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
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

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

/// Cut to `max_len` characters, ending in `...` when shortened.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}
