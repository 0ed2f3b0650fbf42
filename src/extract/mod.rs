//! Extraction module: turns a feed entry and its project page into a record
//!
//! This module contains:
//! - The generic ordered extractor pipeline
//! - The item field pipeline (`id`, `url`, `Creator`, ...)
//! - The reward sub-pipeline run once per reward block
//! - Ordered output records and the id sequence

mod context;
mod document;
mod fields;
mod pipeline;
mod record;
mod rewards;

pub use context::{ExtractionContext, SequenceCounter};
pub use document::{element_text, DetailDocument, RewardBlock, PLEDGE_BLOCK_SELECTOR};
pub use fields::{days_to_go, field_pipeline, FieldPipeline, TextMode};
pub use pipeline::{Extractor, Pipeline};
pub use record::{FieldValue, ItemRecord, Record, REWARDS_KEY, REWARD_KEY};
pub use rewards::{
    extract_rewards, parse_backer_count, parse_limit_total, reward_pipeline, RewardPipeline,
    LIMIT_UNDEFINED, NO_LONGER_AVAILABLE, UNLIMITED,
};
