//! Discovery page cursor
//!
//! The cursor only hands out page descriptors; fetching them is the job of a
//! [`FeedSource`](super::FeedSource).

use crate::config::FeedConfig;
use crate::UrlError;
use url::Url;

/// Path of the discovery endpoint, relative to the configured base URL
const DISCOVER_PATH: &str = "discover/advanced";

/// One page of the discovery feed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryPageDescriptor {
    pub category: String,
    pub sort: String,
    pub page: u32,
    pub format: String,
}

impl DiscoveryPageDescriptor {
    /// Resolves the descriptor against the feed's base URL
    ///
    /// The base's path is treated as a directory whether or not it ends in
    /// `/`, so `https://host/api` resolves under `/api/discover/advanced`.
    ///
    /// ```
    /// use pledge_harvest::feed::DiscoveryPageDescriptor;
    /// use url::Url;
    ///
    /// let descriptor = DiscoveryPageDescriptor {
    ///     category: "16".to_string(),
    ///     sort: "magic".to_string(),
    ///     page: 3,
    ///     format: "json".to_string(),
    /// };
    /// let base = Url::parse("https://www.kickstarter.com").unwrap();
    /// assert_eq!(
    ///     descriptor.to_url(&base).unwrap().as_str(),
    ///     "https://www.kickstarter.com/discover/advanced?category_id=16&sort=magic&page=3&format=json"
    /// );
    /// ```
    pub fn to_url(&self, base: &Url) -> Result<Url, UrlError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut url = base
            .join(DISCOVER_PATH)
            .map_err(|e| UrlError::Parse(e.to_string()))?;

        url.query_pairs_mut()
            .clear()
            .append_pair("category_id", &self.category)
            .append_pair("sort", &self.sort)
            .append_pair("page", &self.page.to_string())
            .append_pair("format", &self.format);

        Ok(url)
    }
}

/// Lazy, unbounded sequence of discovery pages 0, 1, 2, ...
///
/// The cursor never runs out on its own. Termination is decided by the
/// coordinator (quota, empty page, stale pages).
#[derive(Debug, Clone)]
pub struct DiscoveryCursor {
    category: String,
    sort: String,
    format: String,
    next_page: u32,
}

impl DiscoveryCursor {
    /// Creates a cursor positioned at page 0
    pub fn new(
        category: impl Into<String>,
        sort: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            sort: sort.into(),
            format: format.into(),
            next_page: 0,
        }
    }

    /// Creates a cursor from the feed configuration
    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(&config.category_id, &config.sort, &config.format)
    }

    /// Always true: the feed has no end marker
    pub fn has_next(&self) -> bool {
        true
    }

    /// Number of descriptors handed out so far
    pub fn pages_issued(&self) -> u32 {
        self.next_page
    }

    /// Restarts the sequence from page 0
    pub fn reset(&mut self) {
        self.next_page = 0;
    }
}

impl Iterator for DiscoveryCursor {
    type Item = DiscoveryPageDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let descriptor = DiscoveryPageDescriptor {
            category: self.category.clone(),
            sort: self.sort.clone(),
            page: self.next_page,
            format: self.format.clone(),
        };
        self.next_page = self.next_page.saturating_add(1);
        Some(descriptor)
    }
}
