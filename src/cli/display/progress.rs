//! Progress bars for watching running simulations.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {prefix:.bold} {bar:40.cyan/blue} {pos:>3}% {msg}";
const PROGRESS_CHARS: &str = "█▓▒░ ";

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS)
}

/// Create a 0-100 percentage bar labelled with `prefix`.
pub fn create_percent_bar(prefix: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(progress_style());
    pb.set_prefix(prefix.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Extension trait for ProgressBar finishing helpers.
pub trait ProgressBarExt {
    /// Finish with a success message (check mark).
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (cross).
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("\u{2713} {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.abandon_with_message(format!("\u{2717} {}", message.into()));
    }
}

/// Abandon every bar that has not finished yet, leaving it drawn as interrupted.
pub fn abandon_unfinished(bars: &[ProgressBar]) {
    for bar in bars.iter().filter(|bar| !bar.is_finished()) {
        bar.abandon_with_message("interrupted");
    }
}

/// Several bars drawn together, one per watched simulation.
pub struct MultiProgressManager {
    multi: MultiProgress,
}

impl MultiProgressManager {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Manager that draws nothing, for JSON mode and tests.
    pub fn hidden() -> Self {
        let multi = MultiProgress::new();
        multi.set_draw_target(ProgressDrawTarget::hidden());
        Self { multi }
    }

    pub fn add_percent_bar(&self, prefix: impl Into<String>) -> ProgressBar {
        self.multi.add(create_percent_bar(prefix))
    }
}

impl Default for MultiProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
