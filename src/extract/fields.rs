//! Item field extractors
//!
//! Fields, in output order: `id`, `url`, `Creator`, `Title`, `Text`,
//! `DollarsPledged`, `NumBackers`, `DaysToGo`, `AllOrNothing`.

use crate::extract::context::ExtractionContext;
use crate::extract::document::element_text;
use crate::extract::pipeline::Pipeline;
use crate::extract::record::FieldValue;
use crate::{ExtractError, ExtractResult};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Badge that names the funding model of a project
pub const FUNDING_BADGE_SELECTOR: &str = "span.link-soft-black.medium";

/// Badge text marking an all-or-nothing project
pub const ALL_OR_NOTHING_TEXT: &str = "All or nothing";

/// Item field pipeline
pub type FieldPipeline = Pipeline<ExtractionContext>;

/// How the `Text` field renders the project page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// The page exactly as fetched
    Raw,
    /// Markup-free text
    PlainText,
}

impl TextMode {
    pub fn from_plain_text(plain_text: bool) -> Self {
        if plain_text {
            Self::PlainText
        } else {
            Self::Raw
        }
    }
}

/// Builds the item field pipeline in output order
pub fn field_pipeline(text_mode: TextMode) -> FieldPipeline {
    let pipeline: FieldPipeline = Pipeline::new()
        .with("id", extract_id)
        .with("url", extract_url)
        .with("Creator", extract_creator)
        .with("Title", extract_title);

    let pipeline = match text_mode {
        TextMode::Raw => pipeline.with("Text", extract_raw_text),
        TextMode::PlainText => pipeline.with("Text", extract_plain_text),
    };

    pipeline
        .with("DollarsPledged", extract_pledged)
        .with("NumBackers", extract_backers)
        .with("DaysToGo", extract_days_to_go)
        .with("AllOrNothing", extract_all_or_nothing)
}

fn extract_id(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    i64::try_from(ctx.id)
        .map(FieldValue::Int)
        .map_err(|e| ExtractError::MalformedData {
            value: ctx.id.to_string(),
            reason: e.to_string(),
        })
}

fn extract_url(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    Ok(FieldValue::Text(ctx.url.to_string()))
}

fn extract_creator(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    ctx.item.creator_name().map(FieldValue::from)
}

fn extract_title(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    ctx.item.title().map(FieldValue::from)
}

fn extract_raw_text(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    Ok(FieldValue::Text(ctx.document.raw().to_string()))
}

fn extract_plain_text(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    ctx.document.plain_text().map(FieldValue::Text)
}

fn extract_pledged(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    ctx.item.usd_pledged().map(FieldValue::Float)
}

fn extract_backers(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    ctx.item.backers_count().map(FieldValue::Int)
}

fn extract_days_to_go(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    days_to_go(ctx.item.deadline()?, ctx.now).map(FieldValue::Int)
}

fn extract_all_or_nothing(ctx: &ExtractionContext) -> ExtractResult<FieldValue> {
    let all_or_nothing = ctx
        .document
        .select_first(FUNDING_BADGE_SELECTOR)?
        .map(|badge| element_text(badge).contains(ALL_OR_NOTHING_TEXT))
        .unwrap_or(false);

    Ok(FieldValue::Bool(all_or_nothing))
}

/// Whole days from `now_local` until the UTC deadline, truncated toward zero
///
/// Both instants are compared as naive wall-clock times: the deadline in UTC
/// and "now" in the local zone. Negative once the deadline has passed.
pub fn days_to_go(deadline_epoch_secs: i64, now_local: NaiveDateTime) -> ExtractResult<i64> {
    let deadline = DateTime::<Utc>::from_timestamp(deadline_epoch_secs, 0)
        .ok_or_else(|| ExtractError::MalformedData {
            value: deadline_epoch_secs.to_string(),
            reason: "deadline out of range".to_string(),
        })?
        .naive_utc();

    Ok((deadline - now_local).num_days())
}
