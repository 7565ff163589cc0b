use crate::crawler::{Pacing, DEFAULT_USER_AGENTS};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Pagination and stopping behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Number of articles to harvest before stopping
    pub target: u64,

    /// First search result page index
    pub start: u64,

    /// Amount the page index advances after each page
    pub step: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target: 100,
            start: 1,
            step: 1,
        }
    }
}

/// Delay inserted after each harvested article
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Set to false to never sleep between articles
    pub enabled: bool,

    /// Lower bound of the pause (seconds)
    #[serde(rename = "min-secs")]
    pub min_secs: u64,

    /// Upper bound of the pause (seconds)
    #[serde(rename = "max-secs")]
    pub max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_secs: 30,
            max_secs: 60,
        }
    }
}

impl PacingConfig {
    pub fn to_pacing(&self) -> Pacing {
        if self.enabled {
            Pacing::Between {
                min: Duration::from_secs(self.min_secs),
                max: Duration::from_secs(self.max_secs),
            }
        } else {
            Pacing::Disabled
        }
    }
}

/// Progress line appearance and estimator tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Width of the bar in characters
    pub width: usize,

    /// String repeated to fill the bar
    pub mark: String,

    /// Fraction of the interval history drawn per resample.
    /// Larger values narrow the range but make it less likely to hold.
    #[serde(rename = "sample-ratio")]
    pub sample_ratio: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            width: 48,
            mark: "=".to_string(),
            sample_ratio: 0.8,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one JSON file per article
    pub directory: String,

    /// Log file, truncated at the start of every run
    #[serde(rename = "log-path")]
    pub log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "articles".to_string(),
            log_path: "log".to_string(),
        }
    }
}

/// User-Agent pool the session picks from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub agents: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|a| a.to_string()).collect(),
        }
    }
}
