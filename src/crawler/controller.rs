//! Harvest controller - pagination and retry control loop
//!
//! This module drives a harvest run:
//! - Walking search result pages from `start` in increments of `step`
//! - Delegating link, article and metadata extraction to an [`Extractor`]
//! - Classifying failures as recoverable (count and continue) or fatal (abort)
//! - Pausing between harvested articles
//! - Reporting every processed unit to the progress [`Estimator`]
//!
//! Records are produced on demand by [`Records::next`]. Nothing is fetched
//! until the consumer asks for the next record, and a run cannot be restarted
//! once it has finished or aborted.
//!
//! # Stop condition
//!
//! Before each page and each article the controller checks
//! `processed > target`. A run therefore handles one unit past its target
//! before it stops.

use crate::config::{HarvestConfig, ProgressConfig};
use crate::crawler::extract::{Article, Extractor};
use crate::crawler::fetcher::Fetch;
use crate::crawler::session::Session;
use crate::crawler::template::PageTemplate;
use crate::progress::{Estimator, NullProgress, ProgressSink};
use crate::{HarvestError, ParseFailure, Result};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::error::Error as _;
use std::time::Duration;
use tracing::{Instrument, Span};

/// Delay inserted after each harvested article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Never pause
    Disabled,

    /// Pause a uniformly random duration within the bounds (inclusive)
    Between { min: Duration, max: Duration },
}

impl Pacing {
    /// Draws the next pause, in whole milliseconds
    pub fn next_delay(&self, rng: &mut fastrand::Rng) -> Duration {
        match *self {
            Pacing::Disabled => Duration::ZERO,
            Pacing::Between { min, max } => {
                let lo = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
                let hi = u64::try_from(max.as_millis()).unwrap_or(u64::MAX).max(lo);
                Duration::from_millis(rng.u64(lo..=hi))
            }
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Between {
            min: Duration::from_secs(30),
            max: Duration::from_secs(60),
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has been requested yet
    Idle,
    /// The next pull fetches a search result page
    FetchingPage,
    /// The next pull works through links of the current page
    ExtractingArticles,
    /// Stop condition reached
    Done,
    /// A fatal failure ended the run
    Aborted,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted)
    }
}

/// Builder for a harvest run
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::crawler::{Harvester, HttpFetcher};
/// use sumi_harvest::sites::StarTribune;
///
/// # async fn example() -> Result<(), sumi_harvest::HarvestError> {
/// let template = StarTribune::search_template("transit")?;
/// let mut records = Harvester::new(HttpFetcher::new()?, StarTribune::new()?, template).records();
///
/// while let Some(article) = records.next().await {
///     println!("{}", article?.content());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Harvester<F, E> {
    fetcher: F,
    extractor: E,
    template: PageTemplate,
    harvest: HarvestConfig,
    pacing: Pacing,
    progress: ProgressConfig,
    sink: Box<dyn ProgressSink + Send>,
    span: Span,
    session: Option<Session>,
    rng: fastrand::Rng,
}

impl<F: Fetch, E: Extractor> Harvester<F, E> {
    pub fn new(fetcher: F, extractor: E, template: PageTemplate) -> Self {
        Self {
            fetcher,
            extractor,
            template,
            harvest: HarvestConfig::default(),
            pacing: Pacing::default(),
            progress: ProgressConfig::default(),
            sink: Box::new(NullProgress),
            span: tracing::info_span!("harvest"),
            session: None,
            rng: fastrand::Rng::new(),
        }
    }

    /// Sets the target count, starting page and page step
    pub fn harvest(mut self, harvest: HarvestConfig) -> Self {
        self.harvest = harvest;
        self
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets the estimator's sample ratio (the bar shape belongs to the sink)
    pub fn progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress_sink(mut self, sink: Box<dyn ProgressSink + Send>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the span every log entry of the run is recorded in
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Uses the given headers instead of a fresh session
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Seeds the pacing and resampling randomness
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Starts the run; the returned records are produced lazily
    pub fn records(mut self) -> Records<F, E> {
        let session = self
            .session
            .take()
            .unwrap_or_else(|| Session::new(&[], self.template.site_root()));

        let estimator = Estimator::new(self.harvest.target)
            .with_sample_ratio(self.progress.sample_ratio)
            .with_rng(self.rng.fork())
            .with_sink(self.sink);

        Records {
            fetcher: self.fetcher,
            extractor: self.extractor,
            template: self.template,
            target: self.harvest.target,
            step: self.harvest.step,
            cursor: self.harvest.start,
            processed: 0,
            pacing: self.pacing,
            session,
            estimator,
            pending: VecDeque::new(),
            state: RunState::Idle,
            span: self.span,
            rng: self.rng,
        }
    }
}

/// Lazily produced article records of one run
pub struct Records<F, E> {
    fetcher: F,
    extractor: E,
    template: PageTemplate,
    target: u64,
    step: u64,
    cursor: u64,
    processed: u64,
    pacing: Pacing,
    session: Session,
    estimator: Estimator,
    pending: VecDeque<String>,
    state: RunState,
    span: Span,
    rng: fastrand::Rng,
}

impl<F: Fetch, E: Extractor> Records<F, E> {
    /// Produces the next record
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Article))` - The next harvested article
    /// * `Some(Err(HarvestError))` - A fatal failure; the run is over
    /// * `None` - The run is done or was aborted earlier
    pub async fn next(&mut self) -> Option<Result<Article>> {
        let span = self.span.clone();
        self.advance().instrument(span).await
    }

    /// Adapts the records into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<Article>> {
        stream::unfold(self, |mut records| async move {
            let item = records.next().await?;
            Some((item, records))
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Units processed so far, successful or recoverably failed
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Index of the page the next fetch will request
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn progress(&self) -> &Estimator {
        &self.estimator
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn stop_reached(&self) -> bool {
        self.processed > self.target
    }

    async fn advance(&mut self) -> Option<Result<Article>> {
        loop {
            match self.state {
                RunState::Done | RunState::Aborted => return None,

                RunState::Idle => {
                    self.estimator.start();
                    self.state = RunState::FetchingPage;
                }

                RunState::FetchingPage => {
                    if self.stop_reached() {
                        self.finish();
                        return None;
                    }

                    match self.harvest_page().await {
                        Ok(true) => self.state = RunState::ExtractingArticles,
                        Ok(false) => {
                            if let Err(e) = self.next_page() {
                                return Some(Err(self.abort(e)));
                            }
                        }
                        Err(e) => return Some(Err(self.abort(e))),
                    }
                }

                RunState::ExtractingArticles => {
                    if self.stop_reached() {
                        self.finish();
                        return None;
                    }

                    let Some(link) = self.pending.pop_front() else {
                        if let Err(e) = self.next_page() {
                            return Some(Err(self.abort(e)));
                        }
                        self.state = RunState::FetchingPage;
                        continue;
                    };

                    match self.harvest_article(&link).await {
                        Ok(Some(article)) => return Some(Ok(article)),
                        Ok(None) => {}
                        Err(e) => return Some(Err(self.abort(e))),
                    }
                }
            }
        }
    }

    /// Fetches the current search page and queues its links
    ///
    /// Returns `false` when the page failed recoverably and was counted.
    async fn harvest_page(&mut self) -> Result<bool> {
        let url = self.template.page_url(self.cursor);
        tracing::info!("Extracting search results from {}", url);

        let page = self.fetcher.fetch(&url, self.session.headers()).await?;
        self.session.set_referer(&url);

        match self.extractor.extract_links(&page.body, &url).classify()? {
            Ok(links) if links.is_empty() => {
                tracing::warn!("No article links on page {}, counting it as processed", self.cursor);
                self.count()?;
                Ok(false)
            }
            Ok(links) => {
                tracing::debug!("Found {} article links on page {}", links.len(), self.cursor);
                self.pending = links.into();
                Ok(true)
            }
            Err(failure) => {
                self.skip(&failure)?;
                Ok(false)
            }
        }
    }

    /// Fetches and extracts one article
    ///
    /// Returns `None` when the article failed recoverably and was counted.
    async fn harvest_article(&mut self, url: &str) -> Result<Option<Article>> {
        tracing::info!("Extracting article from {}", url);

        let page = self.fetcher.fetch(url, self.session.headers()).await?;

        let content = match self.extractor.extract_article(&page.body, url).classify()? {
            Ok(content) => content,
            Err(failure) => {
                self.skip(&failure)?;
                return Ok(None);
            }
        };

        let metadata = match self.extractor.extract_metadata(&page.body, url).classify()? {
            Ok(metadata) => metadata,
            Err(failure) => {
                self.skip(&failure)?;
                return Ok(None);
            }
        };

        let article = Article::new(metadata, content);

        self.pause().await;
        self.count()?;
        Ok(Some(article))
    }

    /// Logs a recoverable failure and still counts its unit
    fn skip(&mut self, failure: &ParseFailure) -> Result<()> {
        tracing::error!("{}", failure);
        self.count()
    }

    fn count(&mut self) -> Result<()> {
        self.processed += 1;
        self.estimator.tick()?;
        Ok(())
    }

    async fn pause(&mut self) {
        let delay = self.pacing.next_delay(&mut self.rng);
        if !delay.is_zero() {
            tracing::debug!("Pausing for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    fn next_page(&mut self) -> Result<()> {
        self.cursor = self
            .cursor
            .checked_add(self.step)
            .ok_or(HarvestError::CursorOverflow(self.cursor))?;
        Ok(())
    }

    fn finish(&mut self) {
        tracing::info!(
            "Harvest complete: {} units processed (target {})",
            self.processed,
            self.target
        );
        self.pending.clear();
        self.state = RunState::Done;
    }

    /// Logs a fatal failure with its full cause chain and ends the run
    fn abort(&mut self, error: HarvestError) -> HarvestError {
        let mut trace = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        tracing::error!("Error occurred while harvesting: {}\n{:?}", trace, error);

        self.pending.clear();
        self.state = RunState::Aborted;
        error
    }
}
