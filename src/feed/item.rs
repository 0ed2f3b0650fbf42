//! Discovery feed entries
//!
//! Entries are kept as opaque JSON. A missing or mistyped field only fails
//! the extractor that asks for it, never the page that carried the entry.

use crate::{ExtractError, ExtractResult, HarvestError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON pointers into a feed entry
pub mod paths {
    pub const PROJECT_URL: &str = "/urls/web/project";
    pub const CREATOR_NAME: &str = "/creator/name";
    pub const TITLE: &str = "/name";
    pub const USD_PLEDGED: &str = "/usd_pledged";
    pub const BACKERS_COUNT: &str = "/backers_count";
    pub const DEADLINE: &str = "/deadline";
}

/// One project entry returned by the discovery feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedItem(Value);

/// Body of a discovery page response
#[derive(Debug, Deserialize)]
struct DiscoveryPage {
    #[serde(default)]
    projects: Vec<FeedItem>,
}

impl FeedItem {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The project's web URL as published by the feed
    pub fn project_url(&self) -> ExtractResult<&str> {
        self.str_at(paths::PROJECT_URL)
    }

    pub fn creator_name(&self) -> ExtractResult<&str> {
        self.str_at(paths::CREATOR_NAME)
    }

    pub fn title(&self) -> ExtractResult<&str> {
        self.str_at(paths::TITLE)
    }

    /// Pledged amount in USD; the feed sends it as a number or a numeric string
    pub fn usd_pledged(&self) -> ExtractResult<f64> {
        match self.value_at(paths::USD_PLEDGED)? {
            Value::Number(n) => n.as_f64().ok_or_else(|| malformed(n, "not a finite number")),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                Ok(_) => Err(malformed(s, "not a finite number")),
                Err(e) => Err(malformed(s, &e.to_string())),
            },
            other => Err(malformed(other, "expected a number")),
        }
    }

    pub fn backers_count(&self) -> ExtractResult<i64> {
        self.integer_at(paths::BACKERS_COUNT)
    }

    /// Deadline as Unix epoch seconds (UTC)
    pub fn deadline(&self) -> ExtractResult<i64> {
        self.integer_at(paths::DEADLINE)
    }

    fn value_at(&self, path: &str) -> ExtractResult<&Value> {
        match self.0.pointer(path) {
            Some(Value::Null) | None => Err(ExtractError::MissingField {
                path: path.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    fn str_at(&self, path: &str) -> ExtractResult<&str> {
        let value = self.value_at(path)?;
        value
            .as_str()
            .ok_or_else(|| malformed(value, "expected a string"))
    }

    fn integer_at(&self, path: &str) -> ExtractResult<i64> {
        match self.value_at(path)? {
            Value::Number(n) => n.as_i64().ok_or_else(|| malformed(n, "not an integer")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| malformed(s, &e.to_string())),
            other => Err(malformed(other, "expected an integer")),
        }
    }
}

impl From<Value> for FeedItem {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn malformed(value: impl ToString, reason: &str) -> ExtractError {
    ExtractError::MalformedData {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Decodes a discovery page body into its feed entries
///
/// A body without a `projects` array decodes to an empty page.
pub fn decode_page(url: &str, body: &str) -> Result<Vec<FeedItem>, HarvestError> {
    let page: DiscoveryPage =
        serde_json::from_str(body).map_err(|source| HarvestError::FeedParse {
            url: url.to_string(),
            source,
        })?;
    Ok(page.projects)
}
