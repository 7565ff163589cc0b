//! Star Tribune (startribune.com) search scraper
//!
//! Search results live in `div.searchEntry` blocks. Articles carry their
//! publication date in an `updatedBy` element reading
//! `Updated: <date> - <more>`.

use crate::crawler::{parse_selector, resolve_link, Extractor, Metadata, PageTemplate};
use crate::{HarvestError, Outcome, ParseFailure};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::form_urlencoded;

const SEARCH_URL: &str = "http://www.startribune.com/search/";

/// Extractor for Star Tribune search results and articles
pub struct StarTribune {
    entry: Selector,
    anchor: Selector,
    updated_by: Selector,
    title: Selector,
    pub_date: Regex,
}

impl StarTribune {
    pub fn new() -> Result<Self, HarvestError> {
        let pub_date = Regex::new(r"Updated: (.*) -")
            .map_err(|e| HarvestError::Pattern(format!("publication date: {}", e)))?;

        Ok(Self {
            entry: parse_selector("div.searchEntry")?,
            anchor: parse_selector("a[href]")?,
            updated_by: parse_selector("li.updatedBy, span.updatedBy")?,
            title: parse_selector("title")?,
            pub_date,
        })
    }

    /// Template for the result pages of a search for `query`
    pub fn search_template(query: &str) -> Result<PageTemplate, HarvestError> {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        PageTemplate::parse(&format!("{}?stq={}&page={{page}}", SEARCH_URL, encoded))
    }
}

impl Extractor for StarTribune {
    fn extract_links(&self, html: &str, url: &str) -> Outcome<Vec<String>> {
        let document = Html::parse_document(html);

        let entries: Vec<_> = document.select(&self.entry).collect();
        if entries.is_empty() {
            return ParseFailure::new("No search result links found")
                .with_url(url)
                .into();
        }

        let links: Vec<String> = entries
            .iter()
            .filter_map(|entry| entry.select(&self.anchor).next())
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_link(href, url))
            .collect();

        if links.is_empty() {
            return ParseFailure::new("No search result links found")
                .with_snippet(entries[0].html())
                .with_url(url)
                .into();
        }

        Outcome::Ok(links)
    }

    fn extract_metadata(&self, html: &str, url: &str) -> Outcome<Metadata> {
        let document = Html::parse_document(html);

        let Some(date_tag) = document.select(&self.updated_by).next() else {
            return ParseFailure::new("Publication date not found")
                .with_url(url)
                .into();
        };

        let raw_date: String = date_tag.text().collect();
        let Some(pub_date) = self
            .pub_date
            .captures(&raw_date)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            return ParseFailure::new("No publication date found.")
                .with_snippet(date_tag.html())
                .with_url(url)
                .into();
        };

        let Some(title_tag) = document.select(&self.title).next() else {
            return ParseFailure::new("No title found.").with_url(url).into();
        };
        let title: String = title_tag.text().collect();

        let mut metadata = Metadata::new();
        metadata.insert("pub_date".to_string(), Value::String(pub_date));
        metadata.insert("url".to_string(), Value::String(url.to_string()));
        metadata.insert("title".to_string(), Value::String(title));
        Outcome::Ok(metadata)
    }
}
