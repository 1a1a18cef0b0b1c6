//! Shared helper functions for CLI commands.

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

use gridscrape::models::TaskOutcome;

pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

pub fn warning() -> StyledObject<&'static str> {
    style("!").yellow()
}

pub fn arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

/// Progress bar over `total` brand tasks.
pub fn brand_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

/// One status line for a finished brand.
pub fn outcome_line(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Success {
            brand,
            record_count,
        } => format!(
            "  {} {} ({} item{})",
            success(),
            brand,
            record_count,
            if *record_count == 1 { "" } else { "s" }
        ),
        TaskOutcome::Failure { brand, cause } => {
            format!("  {} {}: {}", error(), brand, style(cause).dim())
        }
    }
}
