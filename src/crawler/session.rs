//! Outgoing request headers for one harvest run

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};

/// Built-in desktop browser User-Agent pool
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Header set sent with every request of a run
///
/// Owned by a single run; the referer follows the search pages as they are fetched.
#[derive(Debug, Clone)]
pub struct Session {
    headers: HeaderMap,
}

impl Session {
    /// Creates a session with a User-Agent picked at random from `agents`
    ///
    /// Agents that are not valid header values are skipped; with none left the
    /// built-in pool is used.
    pub fn new(agents: &[String], referer: &str) -> Self {
        Self::with_rng(agents, referer, &mut fastrand::Rng::new())
    }

    pub fn with_rng(agents: &[String], referer: &str, rng: &mut fastrand::Rng) -> Self {
        let mut pool: Vec<HeaderValue> = agents
            .iter()
            .filter_map(|a| HeaderValue::from_str(a).ok())
            .collect();
        if pool.is_empty() {
            pool = DEFAULT_USER_AGENTS
                .iter()
                .map(|a| HeaderValue::from_static(*a))
                .collect();
        }
        let agent = pool.swap_remove(rng.usize(..pool.len()));

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, agent);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let mut session = Self { headers };
        session.set_referer(referer);
        session
    }

    /// Points the referer at `url`; values that cannot be sent as a header are ignored
    pub fn set_referer(&mut self, url: &str) {
        match HeaderValue::from_str(url) {
            Ok(value) => {
                self.headers.insert(REFERER, value);
            }
            Err(_) => tracing::debug!("Not using {} as referer", url),
        }
    }

    pub fn referer(&self) -> Option<&str> {
        self.headers.get(REFERER).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
