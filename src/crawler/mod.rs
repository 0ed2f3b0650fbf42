//! Crawler module for feed walking and item harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - The run-scoped dedup set
//! - Politeness delays
//! - Overall crawl coordination

mod coordinator;
mod dedup;
mod fetcher;
mod throttle;

pub use coordinator::{Clock, Coordinator, CrawlReport};
pub use dedup::DedupTracker;
pub use fetcher::{backoff_delay, build_http_client, DocumentFetcher, HttpFetcher};
pub use throttle::Throttle;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Walk discovery pages from page 0
/// 3. Fetch and extract every new item
/// 4. Stop on quota, feed exhaustion, stale pages, or a failed page
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `quota` - Number of records to collect
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Records, statistics and the reason the run stopped
/// * `Err(HarvestError)` - The run could not start
pub async fn crawl(config: Config, quota: usize) -> Result<CrawlReport, HarvestError> {
    Coordinator::new(config, quota)?.run().await
}
