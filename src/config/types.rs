use serde::Deserialize;

/// Main configuration structure for Pledge-Harvest
///
/// Every section and key is optional; a missing file or an empty file yields
/// [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub feed: FeedConfig,
    pub extraction: ExtractionConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause after each processed item (milliseconds)
    #[serde(rename = "item-delay-ms")]
    pub item_delay_ms: u64,

    /// Pause after each discovery page (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Consecutive pages without a new record before the run stops (0 = never)
    #[serde(rename = "max-stale-pages")]
    pub max_stale_pages: u32,

    /// Write a checkpoint every N accumulated records (0 = never)
    #[serde(rename = "checkpoint-every")]
    pub checkpoint_every: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            item_delay_ms: 2000,
            page_delay_ms: 2000,
            max_stale_pages: 3,
            checkpoint_every: 10,
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First backoff delay, doubled on every retry (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

/// Discovery feed location and query
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "category-id")]
    pub category_id: String,

    pub sort: String,

    pub format: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.kickstarter.com".to_string(),
            category_id: "16".to_string(),
            sort: "magic".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Field extraction options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Emit `Text` as plain text instead of the raw page
    #[serde(rename = "plain-text")]
    pub plain_text: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { plain_text: true }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PledgeHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
