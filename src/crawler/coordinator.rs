//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the harvesting process, including:
//! - Walking the discovery feed page by page
//! - Skipping items already handled in this run
//! - Fetching project pages and running both extractor pipelines
//! - Pacing requests and deciding when the run is over
//! - Periodic checkpoints of the partial result

use crate::config::Config;
use crate::crawler::dedup::DedupTracker;
use crate::crawler::fetcher::{DocumentFetcher, HttpFetcher};
use crate::crawler::throttle::Throttle;
use crate::extract::{
    extract_rewards, field_pipeline, reward_pipeline, DetailDocument, ExtractionContext,
    FieldPipeline, ItemRecord, RewardPipeline, SequenceCounter, TextMode,
};
use crate::feed::{DiscoveryCursor, FeedItem, FeedSource};
use crate::output::{self, CrawlResult, CrawlStatistics, FailureStage};
use crate::state::{CompletionReason, CrawlState};
use crate::url::canonical_item_url;
use crate::HarvestError;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Source of the local wall-clock time used for `DaysToGo`
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Everything a finished run produced
#[derive(Debug)]
pub struct CrawlReport {
    pub result: CrawlResult,
    pub stats: CrawlStatistics,
    pub reason: CompletionReason,
}

impl CrawlReport {
    /// The state the run ended in
    pub fn final_state(&self) -> CrawlState {
        self.reason.final_state()
    }

    pub fn is_aborted(&self) -> bool {
        self.final_state() == CrawlState::Aborted
    }
}

/// A record, or the stage and message of the extraction failure
type Extracted = Result<ItemRecord, (FailureStage, String)>;

/// What happened to a single feed entry
enum ItemOutcome {
    Duplicate,
    Accumulated,
    Failed,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    feed: Arc<dyn FeedSource>,
    documents: Arc<dyn DocumentFetcher>,
    cursor: DiscoveryCursor,
    dedup: DedupTracker,
    sequence: SequenceCounter,
    fields: FieldPipeline,
    rewards: RewardPipeline,
    throttle: Throttle,
    result: CrawlResult,
    stats: CrawlStatistics,
    state: CrawlState,
    quota: usize,
    clock: Clock,
    checkpoint: Option<PathBuf>,
}

impl Coordinator {
    /// Creates a coordinator that talks HTTP to the configured feed
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `quota` - Number of records to collect
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client or base URL could not be built
    pub fn new(config: Config, quota: usize) -> Result<Self, HarvestError> {
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        Ok(Self::with_sources(config, quota, fetcher.clone(), fetcher))
    }

    /// Creates a coordinator around arbitrary collaborators
    pub fn with_sources(
        config: Config,
        quota: usize,
        feed: Arc<dyn FeedSource>,
        documents: Arc<dyn DocumentFetcher>,
    ) -> Self {
        let cursor = DiscoveryCursor::from_config(&config.feed);
        let throttle = Throttle::from_config(&config.crawler);
        let fields = field_pipeline(TextMode::from_plain_text(config.extraction.plain_text));

        Self {
            config: Arc::new(config),
            feed,
            documents,
            cursor,
            dedup: DedupTracker::new(),
            sequence: SequenceCounter::new(),
            fields,
            rewards: reward_pipeline(),
            throttle,
            result: CrawlResult::new(),
            stats: CrawlStatistics::new(),
            state: CrawlState::Discovering,
            quota,
            clock: Box::new(|| Local::now().naive_local()),
            checkpoint: None,
        }
    }

    /// Replaces the wall clock used for `DaysToGo`
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Writes the partial result to `path` every `checkpoint-every` records
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    /// Replaces the default extractor pipelines
    pub fn with_pipelines(mut self, fields: FieldPipeline, rewards: RewardPipeline) -> Self {
        self.fields = fields;
        self.rewards = rewards;
        self
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the main crawl loop until a terminal state
    ///
    /// Per discovery page:
    /// 1. Stop if the quota is already met
    /// 2. Fetch the next page; an error aborts, an empty page completes
    /// 3. Process each entry (dedup, fetch, extract, accumulate)
    /// 4. Stop after too many consecutive pages without a new record
    /// 5. Pause, then move on to the next page
    ///
    /// Only an invalid state transition is returned as `Err`; every other
    /// outcome, including an aborted run, is a [`CrawlReport`].
    pub async fn run(mut self) -> Result<CrawlReport, HarvestError> {
        let start_time = Instant::now();
        let mut stale_pages = 0u32;

        tracing::info!(
            "Starting harvest: quota {}, category {}, sort {}",
            self.quota,
            self.config.feed.category_id,
            self.config.feed.sort
        );

        let reason = loop {
            if self.quota_reached() {
                self.transition(CrawlState::Completed)?;
                break CompletionReason::QuotaReached;
            }

            let Some(descriptor) = self.cursor.next() else {
                self.transition(CrawlState::Completed)?;
                break CompletionReason::FeedExhausted;
            };

            self.transition(CrawlState::FetchingPage)?;
            tracing::debug!("Fetching discovery page {}", descriptor.page);

            let items = match self.feed.fetch_page(&descriptor).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("Discovery page {} failed: {}", descriptor.page, e);
                    self.transition(CrawlState::Aborted)?;
                    break CompletionReason::Aborted {
                        page: descriptor.page,
                        error: e.to_string(),
                    };
                }
            };

            if items.is_empty() {
                tracing::info!("Discovery page {} is empty, feed exhausted", descriptor.page);
                self.transition(CrawlState::Completed)?;
                break CompletionReason::FeedExhausted;
            }

            self.stats.pages_fetched += 1;
            let entries = items.len();
            let before = self.result.len();

            for item in items {
                self.transition(CrawlState::CheckDedup)?;
                if let ItemOutcome::Accumulated = self.process_item(item).await? {
                    if self.quota_reached() {
                        break;
                    }
                }
            }

            let added = self.result.len() - before;
            tracing::info!(
                "Page {}: {} entries, {} new record(s), {}/{} collected",
                descriptor.page,
                entries,
                added,
                self.result.len(),
                self.quota
            );

            if self.quota_reached() {
                self.transition(CrawlState::Completed)?;
                break CompletionReason::QuotaReached;
            }

            stale_pages = if added == 0 { stale_pages + 1 } else { 0 };
            self.enter_rate_limiting()?;

            let max_stale = self.config.crawler.max_stale_pages;
            if max_stale > 0 && stale_pages >= max_stale {
                tracing::info!("{} consecutive pages without new records, stopping", stale_pages);
                self.transition(CrawlState::Completed)?;
                break CompletionReason::StalePages { pages: stale_pages };
            }

            self.throttle.after_page().await;
            self.transition(CrawlState::Discovering)?;
        };

        self.stats.elapsed = start_time.elapsed();
        self.stats.paused = self.throttle.total_paused();
        self.stats.log_summary(&reason);

        Ok(CrawlReport {
            result: self.result,
            stats: self.stats,
            reason,
        })
    }

    /// Handles one feed entry, starting in `CheckDedup`
    ///
    /// Failures are recorded and swallowed; the loop always carries on with
    /// the next entry.
    async fn process_item(&mut self, item: FeedItem) -> Result<ItemOutcome, HarvestError> {
        self.stats.items_seen += 1;

        let url = match item
            .project_url()
            .map_err(|e| e.to_string())
            .and_then(|raw| canonical_item_url(raw).map_err(|e| format!("{}: {}", raw, e)))
        {
            Ok(url) => url,
            Err(message) => {
                tracing::warn!("Skipping feed entry without a usable URL: {}", message);
                self.stats
                    .record_failure("<unknown>", FailureStage::Url, message);
                return Ok(ItemOutcome::Failed);
            }
        };

        if self.dedup.seen(&url) {
            tracing::debug!("Skipping duplicate {}", url);
            self.stats.duplicates_skipped += 1;
            return Ok(ItemOutcome::Duplicate);
        }
        self.dedup.mark(&url);

        self.transition(CrawlState::FetchingItem)?;
        let body = match self.documents.fetch_document(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                self.stats
                    .record_failure(url.as_str(), FailureStage::Fetch, e.to_string());
                self.enter_rate_limiting()?;
                self.throttle.after_item().await;
                return Ok(ItemOutcome::Failed);
            }
        };

        let outcome = match self.extract(url.clone(), item, body)? {
            Ok(record) => {
                self.transition(CrawlState::Accumulating)?;
                let id = self.sequence.commit();
                tracing::debug!("Accumulated record {} for {}", id, url);
                self.result.push(record);
                self.stats.items_succeeded += 1;
                self.maybe_checkpoint();

                // no trailing delay once the quota is met
                if self.quota_reached() {
                    return Ok(ItemOutcome::Accumulated);
                }
                ItemOutcome::Accumulated
            }
            Err((stage, message)) => {
                tracing::warn!("Failed to extract {}: {}", url, message);
                self.stats.record_failure(url.as_str(), stage, message);
                ItemOutcome::Failed
            }
        };

        self.enter_rate_limiting()?;
        self.throttle.after_item().await;

        Ok(outcome)
    }

    /// Runs both pipelines over a fetched page
    ///
    /// Kept synchronous: the parsed document never lives across an await.
    fn extract(
        &mut self,
        url: Url,
        item: FeedItem,
        body: String,
    ) -> Result<Extracted, HarvestError> {
        let ctx = ExtractionContext {
            id: self.sequence.reserve(),
            url,
            item,
            document: DetailDocument::parse(body),
            now: (self.clock)(),
        };

        self.transition(CrawlState::ExtractingFields)?;
        let fields = match self.fields.run(&ctx) {
            Ok(fields) => fields,
            Err(e) => return Ok(Err((FailureStage::Fields, e.to_string()))),
        };

        self.transition(CrawlState::ExtractingRewards)?;
        let rewards = match extract_rewards(&self.rewards, &ctx.document) {
            Ok(rewards) => rewards,
            Err(e) => return Ok(Err((FailureStage::Rewards, e.to_string()))),
        };

        Ok(Ok(ItemRecord::new(fields, rewards)))
    }

    fn quota_reached(&self) -> bool {
        self.result.len() >= self.quota
    }

    fn maybe_checkpoint(&self) {
        let every = self.config.crawler.checkpoint_every;
        let Some(path) = self.checkpoint.as_deref() else {
            return;
        };
        if every == 0 || self.result.len() % every != 0 {
            return;
        }
        write_checkpoint(&self.result, path);
    }

    /// Moves to `RateLimiting` unless the loop is already pausing
    fn enter_rate_limiting(&mut self) -> Result<(), HarvestError> {
        if self.state == CrawlState::RateLimiting {
            return Ok(());
        }
        self.transition(CrawlState::RateLimiting)
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("State {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

fn write_checkpoint(result: &CrawlResult, path: &Path) {
    match output::write_json(result, path) {
        Ok(()) => tracing::info!(
            "Checkpoint: {} record(s) written to {}",
            result.len(),
            path.display()
        ),
        Err(e) => tracing::warn!("Checkpoint to {} failed: {}", path.display(), e),
    }
}
