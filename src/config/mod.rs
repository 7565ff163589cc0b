//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; anything left out falls back to its default.
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting {} articles", config.harvest.target);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HarvestConfig, OutputConfig, PacingConfig, ProgressConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
