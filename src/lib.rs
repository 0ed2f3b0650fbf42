//! Pledge-Harvest: a polite crowdfunding discovery-feed harvester
//!
//! This crate walks a paginated discovery feed, fetches each new project's
//! page, runs an ordered set of field extractors over the feed entry and the
//! page, and collects a quota-bounded list of nested records.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod feed;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Pledge-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url} after {attempts} attempt(s): {message}")]
    Network {
        url: String,
        message: String,
        attempts: u32,
    },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode discovery page {url}: {source}")]
    FeedParse {
        url: String,
        source: serde_json::Error,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised by a single field extractor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("no element matches '{selector}'")]
    MissingElement { selector: String },

    #[error("feed entry has no usable value at '{path}'")]
    MissingField { path: String },

    #[error("malformed value '{value}': {reason}")]
    MalformedData { value: String, reason: String },

    #[error("invalid selector '{css}': {message}")]
    Selector { css: String, message: String },
}

/// An extraction failure tagged with the field whose extractor failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}': {source}")]
pub struct FieldError {
    pub field: &'static str,
    pub source: ExtractError,
}

/// Result type alias for Pledge-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for a single extractor
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Coordinator;
pub use output::CrawlResult;
pub use state::{CompletionReason, CrawlState};
pub use crate::url::canonical_item_url;
