//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for discovery pages and project pages
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::{Config, FetchConfig};
use crate::feed::{decode_page, DiscoveryPageDescriptor, FeedItem, FeedSource};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Retrieves the project page behind an item URL
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the page body as text
    async fn fetch_document(&self, url: &Url) -> Result<String, HarvestError>;
}

/// Outcome of a single request attempt
enum Attempt {
    Done(String),
    /// Worth another try after a backoff
    Transient(HarvestError),
    Fatal(HarvestError),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The full configuration (user agent and fetch timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use pledge_harvest::config::Config;
/// use pledge_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(config.fetch.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`
pub fn backoff_delay(base: Duration, retry: u32) -> Duration {
    let factor = 1u32
        .checked_shl(retry.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// HTTP implementation of both crawl collaborators
///
/// Discovery pages are resolved against the configured base URL and decoded
/// as JSON; project pages are returned as text.
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 429 | Retry with backoff |
/// | HTTP 5xx | Retry with backoff |
/// | Timeout | Retry with backoff |
/// | Connection error | Retry with backoff |
/// | Other HTTP status | Fail immediately |
/// | Other transport error | Fail immediately |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from a validated configuration
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        let base_url = Url::parse(&config.feed.base_url)?;
        Ok(Self::with_client(client, base_url, &config.fetch))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, base_url: Url, fetch: &FetchConfig) -> Self {
        Self {
            client,
            base_url,
            max_retries: fetch.max_retries,
            retry_backoff: Duration::from_millis(fetch.retry_backoff_ms),
        }
    }

    /// GETs `url` and returns the body, retrying transient failures
    pub async fn fetch_text(&self, url: &Url) -> Result<String, HarvestError> {
        let mut retry = 0;

        loop {
            let error = match self.attempt(url, retry + 1).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Transient(e) => e,
            };

            if retry >= self.max_retries {
                tracing::warn!("Giving up on {} after {} attempt(s): {}", url, retry + 1, error);
                return Err(error);
            }

            retry += 1;
            let delay = backoff_delay(self.retry_backoff, retry);
            tracing::warn!(
                "Transient failure for {} ({}), retry {}/{} in {:?}",
                url,
                error,
                retry,
                self.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, url: &Url, attempts: u32) -> Attempt {
        tracing::trace!("GET {} (attempt {})", url, attempts);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = HarvestError::Network {
                    url: url.to_string(),
                    message: describe_transport_error(&e),
                    attempts,
                };
                return if e.is_timeout() || e.is_connect() {
                    Attempt::Transient(error)
                } else {
                    Attempt::Fatal(error)
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error = HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            };
            return if is_retryable_status(status) {
                Attempt::Transient(error)
            } else {
                Attempt::Fatal(error)
            };
        }

        match response.text().await {
            Ok(body) => Attempt::Done(body),
            Err(e) => {
                let error = HarvestError::Network {
                    url: url.to_string(),
                    message: format!("Failed to read body: {}", e),
                    attempts,
                };
                if e.is_timeout() {
                    Attempt::Transient(error)
                } else {
                    Attempt::Fatal(error)
                }
            }
        }
    }
}

#[async_trait]
impl FeedSource for HttpFetcher {
    async fn fetch_page(
        &self,
        descriptor: &DiscoveryPageDescriptor,
    ) -> Result<Vec<FeedItem>, HarvestError> {
        let url = descriptor.to_url(&self.base_url)?;
        let body = self.fetch_text(&url).await?;
        decode_page(url.as_str(), &body)
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_document(&self, url: &Url) -> Result<String, HarvestError> {
        self.fetch_text(url).await
    }
}

/// Rate limiting and server-side errors are worth retrying
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    }
}
