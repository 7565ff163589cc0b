//! Progress tracking for a harvest run
//!
//! This module contains:
//! - The resampling-based time-remaining estimator
//! - The progress sink trait and the terminal progress line
//! - `HH:MM:SS` duration formatting

mod estimator;
mod render;
mod time;

pub use estimator::{Estimate, Estimator, RESAMPLE_TRIALS};
pub use render::{NullProgress, ProgressLine, ProgressSink, ProgressSnapshot};
pub use time::{format_duration, format_time};
