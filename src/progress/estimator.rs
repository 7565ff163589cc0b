//! Time-remaining estimator
//!
//! Keeps the duration of every processed unit and turns that history into a
//! probable range for the remaining work by resampling it.
//!
//! # Estimation
//!
//! With more than two recorded intervals, the estimator runs
//! [`RESAMPLE_TRIALS`] trials. Each trial draws `round(len * sample_ratio)`
//! intervals with replacement, averages them and multiplies the mean by the
//! number of units still outstanding. The sixteen candidates are sorted and
//! the ones at rank 4 and rank 12 become the lower and upper bound.

use crate::progress::render::{NullProgress, ProgressSink, ProgressSnapshot};
use crate::progress::time::format_duration;
use crate::ProgressError;
use std::fmt;
use std::time::{Duration, Instant};

/// Number of resampling trials per estimate
pub const RESAMPLE_TRIALS: usize = 16;

/// Rank (0-based, ascending) of the candidate used as the lower bound
const LOWER_RANK: usize = 4;

/// Rank (0-based, ascending) of the candidate used as the upper bound
const UPPER_RANK: usize = 12;

/// Default fraction of the history drawn per trial
const DEFAULT_SAMPLE_RATIO: f64 = 0.8;

/// Estimated time remaining
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// Not enough history yet (fewer than three intervals)
    Unknown,

    /// Probable range for the remaining work
    Range { lower: Duration, upper: Duration },
}

impl Estimate {
    pub fn is_known(&self) -> bool {
        matches!(self, Estimate::Range { .. })
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Unknown => write!(f, "HH:MM:SS - HH:MM:SS"),
            Estimate::Range { lower, upper } => write!(
                f,
                "{} - {}",
                format_duration(*lower),
                format_duration(*upper)
            ),
        }
    }
}

/// Resampling progress estimator
///
/// One estimator tracks one run. It is told about progress through
/// [`Estimator::tick`] and never reaches back into whoever drives it.
pub struct Estimator {
    total: u64,
    ticks: u64,
    intervals: Vec<f64>,
    accounted: f64,
    start_time: Option<Instant>,
    estimate: Estimate,
    sample_ratio: f64,
    rng: fastrand::Rng,
    sink: Box<dyn ProgressSink + Send>,
}

impl Estimator {
    /// Creates an estimator for `total` units that renders nowhere
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ticks: 0,
            intervals: Vec::new(),
            accounted: 0.0,
            start_time: None,
            estimate: Estimate::Unknown,
            sample_ratio: DEFAULT_SAMPLE_RATIO,
            rng: fastrand::Rng::new(),
            sink: Box::new(NullProgress),
        }
    }

    /// Sets the fraction of history drawn per trial
    ///
    /// Values outside `(0, 1]` are ignored and the default is kept.
    pub fn with_sample_ratio(mut self, ratio: f64) -> Self {
        if ratio > 0.0 && ratio <= 1.0 {
            self.sample_ratio = ratio;
        }
        self
    }

    /// Replaces the random source, mainly so tests can seed it
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Sets where progress is rendered after every change
    pub fn with_sink(mut self, sink: Box<dyn ProgressSink + Send>) -> Self {
        self.sink = sink;
        self
    }

    /// Records the reference start time and renders the initial state
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Same as [`Estimator::start`] with an explicit clock reading
    pub fn start_at(&mut self, now: Instant) {
        self.start_time = Some(now);
        self.render(now);
    }

    pub fn has_started(&self) -> bool {
        self.start_time.is_some()
    }

    /// Counts one processed unit and refreshes the estimate
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The unit was recorded
    /// * `Err(ProgressError::NotStarted)` - `start()` was never called
    pub fn tick(&mut self) -> Result<(), ProgressError> {
        self.tick_at(Instant::now())
    }

    /// Same as [`Estimator::tick`] with an explicit clock reading
    pub fn tick_at(&mut self, now: Instant) -> Result<(), ProgressError> {
        let start = self.start_time.ok_or(ProgressError::NotStarted)?;

        // Elapsed time minus everything already attributed to earlier units
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        let interval = (elapsed - self.accounted).max(0.0);
        self.intervals.push(interval);
        self.accounted += interval;
        self.ticks += 1;

        self.resample();
        self.render(now);
        Ok(())
    }

    pub fn estimate(&self) -> Estimate {
        self.estimate
    }

    pub fn is_done(&self) -> bool {
        self.ticks == self.total
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Per-unit durations recorded so far
    pub fn intervals(&self) -> impl Iterator<Item = Duration> + '_ {
        self.intervals.iter().map(|secs| Duration::from_secs_f64(*secs))
    }

    /// Time since `start()`, or zero before it
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    fn resample(&mut self) {
        let len = self.intervals.len();
        if len <= 2 {
            return;
        }

        // Ticks past the total count as nothing left to do
        let remaining = self.total.saturating_sub(self.ticks) as f64;
        let sample_size = ((len as f64 * self.sample_ratio).round() as usize).max(1);

        let mut candidates: Vec<f64> = (0..RESAMPLE_TRIALS)
            .map(|_| {
                let sum: f64 = (0..sample_size)
                    .map(|_| self.intervals[self.rng.usize(..len)])
                    .sum();
                (sum / sample_size as f64) * remaining
            })
            .collect();
        candidates.sort_by(|a, b| a.total_cmp(b));

        self.estimate = Estimate::Range {
            lower: saturating_secs(candidates[LOWER_RANK]),
            upper: saturating_secs(candidates[UPPER_RANK]),
        };
    }

    fn render(&mut self, now: Instant) {
        let elapsed = self
            .start_time
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();

        let snapshot = ProgressSnapshot {
            ticks: self.ticks,
            total: self.total,
            estimate: self.estimate,
            elapsed,
        };
        self.sink.render(&snapshot);
    }
}

/// Estimates too large for a `Duration` are clamped to `Duration::MAX`
fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl fmt::Debug for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Estimator")
            .field("total", &self.total)
            .field("ticks", &self.ticks)
            .field("intervals", &self.intervals.len())
            .field("estimate", &self.estimate)
            .field("sample_ratio", &self.sample_ratio)
            .finish()
    }
}
