//! Progress rendering
//!
//! The estimator hands a [`ProgressSnapshot`] to a [`ProgressSink`] whenever
//! its state changes. [`ProgressLine`] redraws a single terminal line;
//! [`NullProgress`] discards everything.

use crate::progress::estimator::Estimate;
use crate::progress::time::format_duration;
use std::io::{self, Write};
use std::time::Duration;

/// State of a run at the moment it was rendered
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Units processed so far
    pub ticks: u64,

    /// Units the run is aiming for
    pub total: u64,

    /// Current time-remaining estimate
    pub estimate: Estimate,

    /// Time since the run started
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Completion percentage rounded to two decimals
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let raw = self.ticks as f64 / self.total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn is_done(&self) -> bool {
        self.ticks == self.total
    }
}

/// Receives progress updates
pub trait ProgressSink {
    fn render(&mut self, snapshot: &ProgressSnapshot);
}

/// Sink that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn render(&mut self, _snapshot: &ProgressSnapshot) {}
}

/// Single-line terminal progress bar
///
/// Each render rewinds to the start of the line and prints
/// `<estimate> [<bar>] <percent>% (<ticks>/<total>)`. Once the run is done a
/// total elapsed time line follows.
pub struct ProgressLine<W: Write> {
    writer: W,
    width: usize,
    mark: String,
}

impl ProgressLine<io::Stdout> {
    pub fn stdout(width: usize, mark: impl Into<String>) -> Self {
        Self::new(io::stdout(), width, mark)
    }
}

impl<W: Write> ProgressLine<W> {
    pub fn new(writer: W, width: usize, mark: impl Into<String>) -> Self {
        Self {
            writer,
            width,
            mark: mark.into(),
        }
    }

    /// Consumes the renderer and hands back its writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Builds the text of one render, without writing it
    pub fn format(&self, snapshot: &ProgressSnapshot) -> String {
        let filled = filled_width(snapshot.ticks, snapshot.total, self.width);

        let mut line = format!(
            "\r{} [{}{}] {}% ({}/{})",
            snapshot.estimate,
            self.mark.repeat(filled),
            " ".repeat(self.width - filled),
            snapshot.percent(),
            snapshot.ticks,
            snapshot.total
        );

        if snapshot.is_done() {
            line.push_str(&format!(
                "\nTotal time: {}\n",
                format_duration(snapshot.elapsed)
            ));
        }

        line
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }
}

impl<W: Write> ProgressSink for ProgressLine<W> {
    fn render(&mut self, snapshot: &ProgressSnapshot) {
        let line = self.format(snapshot);
        if let Err(e) = self.write_line(&line) {
            tracing::debug!("Failed to draw progress line: {}", e);
        }
    }
}

/// Scales `ticks` out of `total` onto a bar of `width` cells
fn filled_width(ticks: u64, total: u64, width: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let scaled = ticks.saturating_mul(width as u64) / total;
    scaled.min(width as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ticks: u64, total: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            ticks,
            total,
            estimate: Estimate::Unknown,
            elapsed: Duration::from_secs(75),
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(snapshot(1, 3).percent(), 33.33);
        assert_eq!(snapshot(2, 3).percent(), 66.67);
        assert_eq!(snapshot(3, 3).percent(), 100.0);
        assert_eq!(snapshot(0, 0).percent(), 0.0);
    }

    #[test]
    fn test_filled_width() {
        assert_eq!(filled_width(0, 10, 48), 0);
        assert_eq!(filled_width(5, 10, 48), 24);
        assert_eq!(filled_width(1, 3, 10), 3);
        assert_eq!(filled_width(10, 10, 48), 48);
        assert_eq!(filled_width(11, 10, 48), 48);
        assert_eq!(filled_width(3, 0, 48), 0);
    }

    #[test]
    fn test_format_in_progress_line() {
        let line = ProgressLine::new(Vec::new(), 10, "=");
        assert_eq!(
            line.format(&snapshot(1, 2)),
            "\rHH:MM:SS - HH:MM:SS [=====     ] 50% (1/2)"
        );
    }

    #[test]
    fn test_format_with_estimate_and_custom_mark() {
        let line = ProgressLine::new(Vec::new(), 4, "#");
        let mut snap = snapshot(1, 4);
        snap.estimate = Estimate::Range {
            lower: Duration::from_secs(30),
            upper: Duration::from_secs(95),
        };
        assert_eq!(
            line.format(&snap),
            "\r00:00:30 - 00:01:35 [#   ] 25% (1/4)"
        );
    }

    #[test]
    fn test_format_done_adds_total_time() {
        let line = ProgressLine::new(Vec::new(), 4, "=");
        let text = line.format(&snapshot(4, 4));
        assert!(text.starts_with("\rHH:MM:SS - HH:MM:SS [====] 100% (4/4)"));
        assert!(text.ends_with("\nTotal time: 00:01:15\n"));
    }

    #[test]
    fn test_render_writes_to_writer() {
        let mut line = ProgressLine::new(Vec::new(), 2, "=");
        line.render(&snapshot(0, 2));
        line.render(&snapshot(1, 2));

        let written = String::from_utf8(line.into_inner()).unwrap();
        assert_eq!(written.matches('\r').count(), 2);
        assert!(written.ends_with("[= ] 50% (1/2)"));
    }
}
