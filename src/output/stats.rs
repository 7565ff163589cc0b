//! Summary of a finished harvest run

use crate::progress::format_duration;
use std::time::Duration;

/// Outcome counts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Articles yielded and written
    pub articles: u64,

    /// Units counted by the progress estimator, skipped ones included
    pub processed: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,

    /// Whether the run ended on a fatal failure
    pub aborted: bool,
}

impl HarvestSummary {
    /// Units that were counted without producing an article
    pub fn skipped(&self) -> u64 {
        self.processed.saturating_sub(self.articles)
    }

    /// Share of processed units that produced an article, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.articles as f64 / self.processed as f64) * 100.0
    }
}

/// Formats a summary as a short report
pub fn format_summary(summary: &HarvestSummary) -> String {
    let status = if summary.aborted { "aborted" } else { "complete" };
    format!(
        "Harvest {}: {} articles, {} skipped ({:.1}% success) in {}",
        status,
        summary.articles,
        summary.skipped(),
        summary.success_rate(),
        format_duration(summary.elapsed)
    )
}

/// Prints a summary to stdout
pub fn print_summary(summary: &HarvestSummary) {
    println!("{}", format_summary(summary));
}
