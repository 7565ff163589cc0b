//! Sumi-Harvest: an incremental article harvester
//!
//! This crate walks the numbered result pages of a web search, extracts
//! article links, fetches and cleans each article, and yields structured
//! records one at a time while estimating how long the remaining work will take.

pub mod config;
pub mod crawler;
pub mod output;
pub mod progress;
pub mod sites;

use thiserror::Error;

/// Fatal error type for Sumi-Harvest operations
///
/// Anything surfacing as a `HarvestError` aborts the run it occurred in.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Extraction failed for {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Invalid extraction pattern: {0}")]
    Pattern(String),

    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    #[error("Page cursor overflowed after page {0}")]
    CursorOverflow(u64),

    #[error("Invalid page template: {0}")]
    Template(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid page template: {0}")]
    InvalidTemplate(String),
}

/// Progress estimator misuse
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("progress estimator ticked before it was started")]
    NotStarted,
}

/// Recoverable parse failure raised by an extraction step
///
/// Signals that expected content is structurally absent from a fetched page.
/// The unit of work it belongs to is still counted, and harvesting continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ParseError: {message}\nSourcecode: {}\nURL: {}", or_na(.snippet), or_na(.url))]
pub struct ParseFailure {
    /// Explanation of what was missing
    pub message: String,

    /// Snippet of the offending source, if one is worth keeping
    pub snippet: Option<String>,

    /// URL of the page that failed to parse
    pub url: Option<String>,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            snippet: None,
            url: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("n/a")
}

/// Tagged result of a single extraction step
///
/// The controller branches on this value: `Ok` continues the unit of work,
/// `Recoverable` counts the unit and moves on, `Fatal` aborts the run.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Recoverable(ParseFailure),
    Fatal(HarvestError),
}

impl<T> Outcome<T> {
    /// Splits the outcome into the fatal channel and the recoverable one
    ///
    /// Lets callers propagate fatal errors with `?` and match on the rest.
    pub fn classify(self) -> Result<std::result::Result<T, ParseFailure>> {
        match self {
            Outcome::Ok(value) => Ok(Ok(value)),
            Outcome::Recoverable(failure) => Ok(Err(failure)),
            Outcome::Fatal(error) => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Recoverable(failure) => Outcome::Recoverable(failure),
            Outcome::Fatal(error) => Outcome::Fatal(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Outcome::Recoverable(_))
    }
}

impl<T> From<ParseFailure> for Outcome<T> {
    fn from(failure: ParseFailure) -> Self {
        Outcome::Recoverable(failure)
    }
}

impl<T> From<HarvestError> for Outcome<T> {
    fn from(error: HarvestError) -> Self {
        Outcome::Fatal(error)
    }
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Article, Extractor, Fetch, Harvester, HttpFetcher, PageTemplate, Records};
pub use progress::{format_time, Estimate, Estimator};
