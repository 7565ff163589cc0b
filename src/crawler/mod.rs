//! Crawler module for paginated article harvesting
//!
//! This module contains the core harvesting logic, including:
//! - The fetch and extraction capabilities a site plugs in
//! - Search result page templates and per-run request headers
//! - The pagination / retry control loop producing article records

mod controller;
mod extract;
mod fetcher;
mod session;
mod template;

pub use controller::{Harvester, Pacing, Records, RunState};
pub use extract::{
    clean_article_text, parse_selector, resolve_link, Article, Extractor, Metadata, CONTENT_KEY,
};
pub use fetcher::{build_http_client, Fetch, FetchedPage, HttpFetcher};
pub use session::{Session, DEFAULT_USER_AGENTS};
pub use template::{PageTemplate, PAGE_PLACEHOLDER};
