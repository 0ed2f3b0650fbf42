//! Politeness delays between requests
//!
//! The crawl is strictly sequential, so pacing is a plain sleep after each
//! processed item and after each discovery page.

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Fixed pauses applied by the coordinator
#[derive(Debug, Clone)]
pub struct Throttle {
    item_delay: Duration,
    page_delay: Duration,
    paused: Duration,
}

impl Throttle {
    pub fn new(item_delay: Duration, page_delay: Duration) -> Self {
        Self {
            item_delay,
            page_delay,
            paused: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.item_delay_ms),
            Duration::from_millis(config.page_delay_ms),
        )
    }

    /// Sleeps for the per-item delay
    pub async fn after_item(&mut self) {
        let delay = self.item_delay;
        self.pause(delay).await;
    }

    /// Sleeps for the per-page delay
    pub async fn after_page(&mut self) {
        let delay = self.page_delay;
        self.pause(delay).await;
    }

    /// Total time spent sleeping so far
    pub fn total_paused(&self) -> Duration {
        self.paused
    }

    async fn pause(&mut self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        tracing::trace!("Rate limiting for {:?}", delay);
        tokio::time::sleep(delay).await;
        self.paused += delay;
    }
}
