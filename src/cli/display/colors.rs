//! Status coloring for CLI output.
//!
//! `console` drops styling automatically when stdout is not a terminal.

use console::{style, StyledObject};

/// Returns a styled string for a simulation status or health value.
///
/// Color scheme:
/// - Green:  completed, healthy
/// - Yellow: running
/// - Blue:   pending
/// - Red:    failed, unhealthy
pub fn colorize_status(status: &str) -> StyledObject<&str> {
    match status.to_lowercase().as_str() {
        "completed" | "healthy" | "ok" => style(status).green().bold(),
        "running" => style(status).yellow(),
        "pending" => style(status).blue(),
        "failed" | "unhealthy" => style(status).red().bold(),
        _ => style(status).white(),
    }
}

/// Dimmed field label for detail views.
pub fn label(key: &str) -> StyledObject<String> {
    style(format!("{key}:")).dim()
}
