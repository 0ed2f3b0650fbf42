//! Reward block extractors
//!
//! Fields, in output order: `Text`, `Price`, `NumBackers`,
//! `TotalPossibleBackers`.

use crate::extract::document::{element_text, DetailDocument, RewardBlock};
use crate::extract::pipeline::Pipeline;
use crate::extract::record::{FieldValue, Record};
use crate::{ExtractError, ExtractResult, FieldError};

pub const DESCRIPTION_SELECTOR: &str =
    "div.pledge__reward-description.pledge__reward-description--expanded";
pub const PRICE_SELECTOR: &str = "span.pledge__currency-conversion";
pub const BACKER_COUNT_SELECTOR: &str = "div.pledge__backer-stats span.pledge__backer-count";
pub const LIMIT_SELECTOR: &str = "div.pledge__backer-stats span.pledge__limit";

/// Limit text of a reward that sold out or was withdrawn
pub const NO_LONGER_AVAILABLE: &str = "Reward no longer available";

/// `TotalPossibleBackers` when the reward has no limit
pub const UNLIMITED: i64 = -1;

/// `TotalPossibleBackers` when the reward is limited but the limit is unreadable
pub const LIMIT_UNDEFINED: i64 = -2;

/// Field name reported when the page cannot be split into reward blocks
const REWARDS_FIELD: &str = "rewards";

/// Reward block pipeline
pub type RewardPipeline = Pipeline<RewardBlock>;

/// Builds the reward pipeline in output order
pub fn reward_pipeline() -> RewardPipeline {
    Pipeline::new()
        .with("Text", extract_text)
        .with("Price", extract_price)
        .with("NumBackers", extract_backers)
        .with("TotalPossibleBackers", extract_total_backers)
}

/// Runs the reward pipeline over every reward block of a page
///
/// Fails as a whole if any block fails.
pub fn extract_rewards(
    pipeline: &RewardPipeline,
    document: &DetailDocument,
) -> Result<Vec<Record>, FieldError> {
    let blocks = document.reward_blocks().map_err(|source| FieldError {
        field: REWARDS_FIELD,
        source,
    })?;

    blocks
        .iter()
        .map(|block| {
            tracing::debug!(position = block.position(), "Extracting reward block");
            pipeline.run(block)
        })
        .collect()
}

fn extract_text(block: &RewardBlock) -> ExtractResult<FieldValue> {
    let description = block.require(DESCRIPTION_SELECTOR)?;
    Ok(FieldValue::Text(element_text(description)))
}

fn extract_price(block: &RewardBlock) -> ExtractResult<FieldValue> {
    let price = block.require(PRICE_SELECTOR)?;
    digits_only(&element_text(price)).map(FieldValue::Int)
}

fn extract_backers(block: &RewardBlock) -> ExtractResult<FieldValue> {
    backer_count(block).map(FieldValue::Int)
}

fn extract_total_backers(block: &RewardBlock) -> ExtractResult<FieldValue> {
    let Some(limit) = block.select_first(LIMIT_SELECTOR)? else {
        return Ok(FieldValue::Int(UNLIMITED));
    };

    let text = element_text(limit);
    if text == NO_LONGER_AVAILABLE {
        return backer_count(block).map(FieldValue::Int);
    }

    Ok(FieldValue::Int(parse_limit_total(&text)))
}

fn backer_count(block: &RewardBlock) -> ExtractResult<i64> {
    let count = block.require(BACKER_COUNT_SELECTOR)?;
    parse_backer_count(&element_text(count))
}

/// Parses every ASCII digit of `text` as one integer
///
/// `"About US$ 1,250"` becomes `1250`. Text without digits is malformed.
pub fn digits_only(text: &str) -> ExtractResult<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();

    digits.parse::<i64>().map_err(|e| ExtractError::MalformedData {
        value: text.to_string(),
        reason: e.to_string(),
    })
}

/// Parses `"<count> backer(s)"` with thousands separators
pub fn parse_backer_count(text: &str) -> ExtractResult<i64> {
    let text = text.trim();
    let count = match text.find(" backer") {
        Some(end) => &text[..end],
        None => text,
    };

    count
        .replace(',', "")
        .trim()
        .parse::<i64>()
        .map_err(|e| ExtractError::MalformedData {
            value: text.to_string(),
            reason: e.to_string(),
        })
}

/// Parses the total from `"Limited (n left of m)"`
///
/// Returns the trailing integer `m`, or [`LIMIT_UNDEFINED`] when the last
/// token is not an integer (`"Limited (sold out)"`).
pub fn parse_limit_total(text: &str) -> i64 {
    text.split_whitespace()
        .last()
        .map(|token| token.trim_end_matches(')').replace(',', ""))
        .and_then(|token| token.parse::<i64>().ok())
        .unwrap_or(LIMIT_UNDEFINED)
}
