//! Run statistics
//!
//! Counters are updated by the coordinator as the crawl progresses and
//! rendered once at the end of the run.

use crate::state::CompletionReason;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Step of an item at which it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureStage {
    /// The item URL in the feed entry was missing or unusable
    Url,
    /// The project page could not be fetched
    Fetch,
    /// A field extractor failed
    Fields,
    /// A reward extractor failed
    Rewards,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Url => "url",
            Self::Fetch => "fetch",
            Self::Fields => "fields",
            Self::Rewards => "rewards",
        };
        f.write_str(name)
    }
}

/// One item that was skipped because of an error
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Canonical URL, or the raw feed value if it could not be canonicalized
    pub url: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Discovery pages fetched successfully
    pub pages_fetched: u32,

    /// Feed entries looked at, duplicates included
    pub items_seen: u64,

    /// Entries skipped because their URL was already handled
    pub duplicates_skipped: u64,

    /// Records accumulated
    pub items_succeeded: u64,

    /// Items skipped because of an error, in order of occurrence
    pub failures: Vec<ItemFailure>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Time spent in politeness delays
    pub paused: Duration,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(
        &mut self,
        url: impl Into<String>,
        stage: FailureStage,
        message: impl Into<String>,
    ) {
        self.failures.push(ItemFailure {
            url: url.into(),
            stage,
            message: message.into(),
        });
    }

    pub fn items_failed(&self) -> usize {
        self.failures.len()
    }

    /// Failure counts grouped by stage
    pub fn failures_by_stage(&self) -> BTreeMap<FailureStage, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.stage).or_insert(0) += 1;
        }
        counts
    }

    /// Share of attempted items that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.items_succeeded + self.failures.len() as u64;
        if attempted > 0 {
            (self.items_succeeded as f64 / attempted as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Emits the summary as a single structured log event
    pub fn log_summary(&self, reason: &CompletionReason) {
        tracing::info!(
            reason = %reason,
            pages = self.pages_fetched,
            items_seen = self.items_seen,
            duplicates = self.duplicates_skipped,
            succeeded = self.items_succeeded,
            failed = self.items_failed(),
            elapsed_secs = self.elapsed.as_secs_f64(),
            "Crawl finished"
        );
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `reason` - Why the run stopped
pub fn print_statistics(stats: &CrawlStatistics, reason: &CompletionReason) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Stopped: {}", reason);
    println!("  Discovery pages fetched: {}", stats.pages_fetched);
    println!("  Feed entries seen: {}", stats.items_seen);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!("  Time in politeness delays: {:.1}s", stats.paused.as_secs_f64());
    println!();

    if !stats.failures.is_empty() {
        println!("Failures by Stage:");
        for (stage, count) in stats.failures_by_stage() {
            println!("  {}: {}", stage, count);
        }
        println!();

        println!("Failed Items ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!("  - [{}] {}: {}", failure.stage, failure.url, failure.message);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} items harvested)",
        stats.success_rate(),
        stats.items_succeeded,
        stats.items_succeeded + stats.failures.len() as u64
    );
}
