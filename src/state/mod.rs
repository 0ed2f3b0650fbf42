//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the orchestrator's current step (page, item, pause, terminal)
//! - `CompletionReason`: why a run stopped

mod crawl_state;

pub use crawl_state::{CompletionReason, CrawlState};
