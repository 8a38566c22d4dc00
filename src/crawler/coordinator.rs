//! Poll loop coordinator
//!
//! Drives the relay cycle:
//! - Fetch the homepage and extract article links
//! - Drop links already accounted for and cap the remainder
//! - Fetch, extract and deliver each article, one at a time
//! - Sleep for the scan interval, or back off after a failure
//!
//! Failures are contained: a bad article never aborts its batch and a bad
//! poll never stops the loop. Only the shutdown token ends `run`.

use crate::config::Config;
use crate::crawler::article::extract_article;
use crate::crawler::fetcher::{build_http_client, HttpFetcher, PageFetcher};
use crate::crawler::links::extract_article_links;
use crate::crawler::pacing::{Pacer, Sleeper, TokioSleeper};
use crate::delivery::{ArticleSink, DeliveryResult, HttpSink};
use crate::state::{PollState, SeenSet};
use crate::RelayError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Counters for one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Article links found on the homepage
    pub discovered: usize,

    /// Links not yet in the seen set
    pub new: usize,

    /// Links processed this poll (new links after capping)
    pub attempted: usize,

    /// Articles the sink stored
    pub delivered: usize,

    /// Articles the sink already had
    pub already_present: usize,

    /// Pages that were not articles
    pub skipped: usize,

    /// Fetch or delivery failures
    pub failed: usize,
}

/// What happened to a single article URL
#[derive(Debug)]
enum ArticleOutcome {
    Delivered(DeliveryResult),
    NotAnArticle,
    FetchFailed,
}

/// Main poll loop structure
///
/// The coordinator is the exclusive owner of the seen set, so no locking is
/// involved in the has/mark checks.
pub struct Coordinator {
    config: Arc<Config>,
    base_url: Url,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn ArticleSink>,
    pacer: Pacer,
    seen: SeenSet,
    state: PollState,
    shutdown: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator talking to the real site and sink
    ///
    /// One HTTP client is shared by page fetches and deliveries.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(RelayError)` - The HTTP client or base URL could not be set up
    pub fn new(config: Config) -> Result<Self, RelayError> {
        let client = build_http_client(&config.http)?;
        let fetcher = Arc::new(HttpFetcher::new(client.clone(), &config.http));
        let sink = Arc::new(HttpSink::new(client, config.delivery.endpoint.clone()));

        Self::from_parts(config, fetcher, sink, Arc::new(TokioSleeper), SeenSet::new())
    }

    /// Creates a coordinator from explicitly provided collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The relay configuration
    /// * `fetcher` - Page fetcher used for the homepage and articles
    /// * `sink` - Downstream delivery target
    /// * `sleeper` - Clock used for pacing, scan interval and backoff waits
    /// * `seen` - Initial seen set, usually empty
    pub fn from_parts(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<dyn ArticleSink>,
        sleeper: Arc<dyn Sleeper>,
        seen: SeenSet,
    ) -> Result<Self, RelayError> {
        let base_url = Url::parse(&config.site.base_url)?;
        let pacer = Pacer::new(config.pacing.clone(), sleeper);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            fetcher,
            sink,
            pacer,
            seen,
            state: PollState::Idle,
            shutdown: CancellationToken::new(),
        })
    }

    /// Current state of the poll loop
    pub fn state(&self) -> PollState {
        self.state
    }

    /// URLs accounted for so far
    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Runs polls until the shutdown token is cancelled
    ///
    /// Cancellation is honoured at iteration and article boundaries and
    /// during the sleep/backoff wait; an article in flight always completes.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        self.shutdown = shutdown.clone();

        tracing::info!(
            "Starting poll loop for {} (every {}s, up to {} articles per poll)",
            self.base_url,
            self.config.poll.scan_interval,
            self.config.poll.max_articles_per_poll
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let next = self.run_iteration().await;
            let Some(wait) = next.wait() else {
                continue;
            };

            tracing::info!("Waiting {}s before next poll", wait.as_secs());

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.pacer.wait(wait) => {}
            }
        }

        tracing::info!(
            "Poll loop stopped; {} articles accounted for this run",
            self.seen.len()
        );
    }

    /// Runs one poll and returns the wait state that should follow it
    ///
    /// Never fails: any error is logged and turned into `FailureBackoff`.
    pub async fn run_iteration(&mut self) -> PollState {
        if self.state.wait().is_some() {
            self.transition(PollState::Idle);
        }

        let next = match self.poll_once().await {
            Ok(report) => {
                tracing::info!(
                    "Poll complete: {} links, {} new, {} attempted, {} delivered, {} already stored, {} skipped, {} failed",
                    report.discovered,
                    report.new,
                    report.attempted,
                    report.delivered,
                    report.already_present,
                    report.skipped,
                    report.failed
                );
                PollState::Sleeping(self.config.poll.scan_interval())
            }
            Err(e) => {
                match &e {
                    RelayError::HttpStatus { .. }
                    | RelayError::Http { .. }
                    | RelayError::Timeout { .. } => {
                        tracing::warn!("Homepage unavailable: {}", e)
                    }
                    _ => tracing::error!("Poll failed: {}", e),
                }
                PollState::FailureBackoff(self.config.poll.failure_backoff())
            }
        };

        self.transition(next);
        next
    }

    /// Performs the homepage fetch and processes the resulting batch
    async fn poll_once(&mut self) -> Result<CycleReport, RelayError> {
        self.transition(PollState::FetchingHomepage);
        tracing::debug!("Fetching homepage {}", self.base_url);

        self.pacer.before_request().await;
        let homepage = self.fetcher.fetch(self.base_url.as_str()).await?;

        if !homepage.is_ok() {
            return Err(RelayError::HttpStatus {
                url: self.base_url.to_string(),
                status_code: homepage.status_code,
            });
        }

        self.transition(PollState::ProcessingLinks);

        let links =
            extract_article_links(&homepage.body, &self.base_url, &self.config.site.domain);
        let fresh: Vec<String> = links
            .iter()
            .filter(|url| !self.seen.contains(url))
            .cloned()
            .collect();

        let mut report = CycleReport {
            discovered: links.len(),
            new: fresh.len(),
            ..CycleReport::default()
        };

        let batch: Vec<String> = fresh
            .into_iter()
            .take(self.config.poll.max_articles_per_poll)
            .collect();

        tracing::info!(
            "Found {} article links, {} new, processing {}",
            report.discovered,
            report.new,
            batch.len()
        );

        let total = batch.len();
        for (index, url) in batch.into_iter().enumerate() {
            if self.shutdown.is_cancelled() {
                tracing::info!(
                    "Shutdown requested, leaving {} articles for a later run",
                    total - index
                );
                break;
            }

            report.attempted += 1;

            match self.process_article(&url).await {
                ArticleOutcome::Delivered(result) => {
                    match result {
                        DeliveryResult::Created => report.delivered += 1,
                        DeliveryResult::AlreadyExists => report.already_present += 1,
                        DeliveryResult::Rejected(_) | DeliveryResult::Unreachable(_) => {
                            report.failed += 1
                        }
                    }

                    if result.is_accounted_for() {
                        self.seen.mark(url);
                    }
                }
                ArticleOutcome::NotAnArticle => report.skipped += 1,
                ArticleOutcome::FetchFailed => report.failed += 1,
            }
        }

        Ok(report)
    }

    /// Fetches, extracts and delivers one article
    async fn process_article(&self, url: &str) -> ArticleOutcome {
        let short_url = truncate_chars(url, 80);

        self.pacer.before_article().await;
        self.pacer.before_request().await;

        tracing::debug!("Fetching article {}", short_url);
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", short_url, e);
                return ArticleOutcome::FetchFailed;
            }
        };

        if !page.is_ok() {
            tracing::warn!("HTTP {} for {}", page.status_code, short_url);
            return ArticleOutcome::FetchFailed;
        }

        if page.final_url != url {
            tracing::debug!(
                "{} redirected to {}",
                short_url,
                truncate_chars(&page.final_url, 80)
            );
        }

        let Some(record) = extract_article(&page.body, url, &self.config.site.name) else {
            tracing::info!("Skipping {}: not an article", short_url);
            return ArticleOutcome::NotAnArticle;
        };

        tracing::info!(
            "Extracted \"{}\" by {} ({}, {} words)",
            truncate_chars(record.title(), 60),
            record.author(),
            record.published(),
            record.word_count()
        );

        self.pacer.before_delivery().await;
        let result = self.sink.deliver(&record).await;

        match &result {
            DeliveryResult::Created => tracing::info!("Delivered {}", short_url),
            DeliveryResult::AlreadyExists => {
                tracing::info!("Already stored downstream: {}", short_url)
            }
            DeliveryResult::Rejected(status) => {
                tracing::warn!("Sink rejected {} with HTTP {}", short_url, status)
            }
            DeliveryResult::Unreachable(reason) => {
                tracing::warn!("Sink unreachable for {}: {}", short_url, reason)
            }
        }

        ArticleOutcome::Delivered(result)
    }

    fn transition(&mut self, next: PollState) {
        if !self.state.can_transition_to(next) {
            tracing::debug!("Unexpected poll state transition: {} -> {}", self.state, next);
        }

        tracing::trace!("Poll state {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Runs the relay until Ctrl-C
///
/// # Example
///
/// ```no_run
/// use article_relay::config::load_config;
/// use article_relay::crawler::run_relay;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("relay.toml"))?;
/// run_relay(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_relay(config: Config) -> Result<(), RelayError> {
    let mut coordinator = Coordinator::new(config)?;
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current step");
            signal_token.cancel();
        }
    });

    coordinator.run(shutdown).await;
    Ok(())
}

/// Truncates to at most `max` characters without splitting a code point
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
