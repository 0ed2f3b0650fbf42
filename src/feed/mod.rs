//! Discovery feed module
//!
//! This module contains:
//! - The page cursor and page descriptors
//! - Opaque feed entries with typed accessors
//! - The `FeedSource` collaborator trait implemented by the HTTP fetcher

mod cursor;
mod item;

pub use cursor::{DiscoveryCursor, DiscoveryPageDescriptor};
pub use item::{decode_page, paths, FeedItem};

use crate::HarvestError;
use async_trait::async_trait;

/// Resolves a page descriptor into the feed entries it lists
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches one discovery page
    ///
    /// An empty vector means the feed has nothing more to offer.
    async fn fetch_page(
        &self,
        descriptor: &DiscoveryPageDescriptor,
    ) -> Result<Vec<FeedItem>, HarvestError>;
}
