//! Output module for persisting harvested articles
//!
//! This module handles:
//! - Writing each harvested article somewhere durable
//! - Summarising a finished run

mod json;
pub mod stats;
mod traits;

pub use json::JsonDirectory;
pub use stats::{format_summary, print_summary, HarvestSummary};
pub use traits::{OutputError, OutputResult, RecordSink};
