//! Extraction capability and article records
//!
//! A site plugs into the harvester by implementing [`Extractor`]: one operation
//! for the links on a search result page, one for the article text and one for
//! the article metadata. Each returns an [`Outcome`], so "this page lacks what
//! we expected" is a value the controller branches on rather than an error
//! that unwinds the run.

use crate::{HarvestError, Outcome, ParseFailure};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Metadata fields extracted from an article page
pub type Metadata = serde_json::Map<String, Value>;

/// Key reserved for the cleaned article text
pub const CONTENT_KEY: &str = "content";

/// Containers tried, in order, when looking for the article body
const ARTICLE_CONTAINERS: &[&str] = &["article", "[itemprop='articleBody']", "main", "body"];

/// Elements whose paragraphs are never article text
const BOILERPLATE: &[&str] = &["script", "style", "noscript", "nav", "aside", "footer", "header", "form"];

/// Site-specific extraction operations
pub trait Extractor: Send + Sync {
    /// Extracts article links from a search result page
    ///
    /// Should return `Outcome::Recoverable` when the page has no results.
    fn extract_links(&self, html: &str, url: &str) -> Outcome<Vec<String>>;

    /// Extracts metadata such as title and publication date from an article page
    ///
    /// Should return `Outcome::Recoverable` when a required field is missing.
    fn extract_metadata(&self, html: &str, url: &str) -> Outcome<Metadata>;

    /// Removes boilerplate and extracts the main text of an article page
    ///
    /// The default implementation uses [`clean_article_text`].
    fn extract_article(&self, html: &str, url: &str) -> Outcome<String> {
        clean_article_text(html, url)
    }
}

/// One harvested article
///
/// Holds every metadata field plus the cleaned text under `content`.
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Article(Metadata);

impl Article {
    /// Merges metadata with the article text; `content` always wins over a metadata field of that name
    pub fn new(mut metadata: Metadata, content: String) -> Self {
        metadata.insert(CONTENT_KEY.to_string(), Value::String(content));
        Self(metadata)
    }

    pub fn content(&self) -> &str {
        self.0
            .get(CONTENT_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string fields
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Metadata {
        &self.0
    }

    pub fn into_map(self) -> Metadata {
        self.0
    }
}

/// Parses a CSS selector, treating a bad one as a fatal programming error
pub fn parse_selector(css: &str) -> Result<Selector, HarvestError> {
    Selector::parse(css)
        .map_err(|e| HarvestError::Pattern(format!("selector '{}': {:?}", css, e)))
}

/// Resolves `href` against the page it was found on
///
/// Returns `None` for empty, fragment-only and non-HTTP(S) links.
pub fn resolve_link(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let absolute = base.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}

/// Generic boilerplate removal
///
/// Looks at each candidate container in turn (`article`, an `articleBody`
/// microdata element, `main`, then `body`) and keeps the one whose paragraphs
/// carry the most text. Paragraphs nested in navigation, asides, footers,
/// headers, forms or scripts are ignored.
///
/// # Returns
///
/// * `Outcome::Ok(String)` - Paragraphs joined by blank lines
/// * `Outcome::Recoverable` - No paragraph text was found
/// * `Outcome::Fatal` - A built-in selector failed to parse
pub fn clean_article_text(html: &str, url: &str) -> Outcome<String> {
    let paragraph = match parse_selector("p") {
        Ok(s) => s,
        Err(e) => return Outcome::Fatal(e),
    };

    let document = Html::parse_document(html);
    let mut best: Vec<String> = Vec::new();
    let mut best_len = 0;

    for css in ARTICLE_CONTAINERS {
        let container = match parse_selector(css) {
            Ok(s) => s,
            Err(e) => return Outcome::Fatal(e),
        };

        for element in document.select(&container) {
            let paragraphs: Vec<String> = element
                .select(&paragraph)
                .filter(|p| !inside_boilerplate(p))
                .map(|p| normalize_whitespace(&p.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect();

            let len: usize = paragraphs.iter().map(String::len).sum();
            if len > best_len {
                best_len = len;
                best = paragraphs;
            }
        }

        // A dedicated article container beats a page-wide one
        if best_len > 0 && *css != "body" {
            break;
        }
    }

    if best.is_empty() {
        return Outcome::Recoverable(
            ParseFailure::new("Failed to extract article.").with_url(url),
        );
    }

    Outcome::Ok(best.join("\n\n"))
}

fn inside_boilerplate(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|e| BOILERPLATE.contains(&e.name()))
            .unwrap_or(false)
    })
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
