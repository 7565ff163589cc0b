//! Search result page URLs

use crate::HarvestError;
use url::Url;

/// Placeholder replaced with the page index
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// URL template for numbered search result pages
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::PageTemplate;
///
/// let template = PageTemplate::parse("https://example.com/search?q=rust&page={page}").unwrap();
/// assert_eq!(template.page_url(3), "https://example.com/search?q=rust&page=3");
/// assert_eq!(template.site_root(), "https://example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    template: String,
    site_root: String,
}

impl PageTemplate {
    /// Parses a template, checking it holds the placeholder and renders to a valid URL
    pub fn parse(template: &str) -> Result<Self, HarvestError> {
        if !template.contains(PAGE_PLACEHOLDER) {
            return Err(HarvestError::Template(format!(
                "'{}' does not contain {}",
                template, PAGE_PLACEHOLDER
            )));
        }

        let sample = Url::parse(&template.replace(PAGE_PLACEHOLDER, "1"))?;
        let host = sample.host_str().ok_or_else(|| {
            HarvestError::Template(format!("'{}' has no host", template))
        })?;
        let site_root = match sample.port() {
            Some(port) => format!("{}://{}:{}", sample.scheme(), host, port),
            None => format!("{}://{}", sample.scheme(), host),
        };

        Ok(Self {
            template: template.to_string(),
            site_root,
        })
    }

    /// URL of the result page with the given index
    pub fn page_url(&self, page: u64) -> String {
        self.template.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Scheme and host of the searched site, used as the first referer
    pub fn site_root(&self) -> &str {
        &self.site_root
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        let template = PageTemplate::parse("http://www.example.com/search/?stq=a&page={page}").unwrap();
        assert_eq!(template.page_url(1), "http://www.example.com/search/?stq=a&page=1");
        assert_eq!(template.page_url(20), "http://www.example.com/search/?stq=a&page=20");
    }

    #[test]
    fn test_site_root_keeps_port() {
        let template = PageTemplate::parse("http://127.0.0.1:8080/s?p={page}").unwrap();
        assert_eq!(template.site_root(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_placeholder() {
        let result = PageTemplate::parse("http://example.com/search?page=1");
        assert!(matches!(result, Err(HarvestError::Template(_))));
    }

    #[test]
    fn test_invalid_url() {
        let result = PageTemplate::parse("not a url {page}");
        assert!(matches!(result, Err(HarvestError::UrlParse(_))));
    }
}
