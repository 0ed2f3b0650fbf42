/// Crawl state definitions for the orchestrator's state machine
///
/// This module defines every state the crawl loop passes through and which
/// moves between them are legal.
use std::fmt;

/// Represents the current state of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Page States =====
    /// Choosing the next discovery page
    Discovering,

    /// Waiting for a discovery page
    FetchingPage,

    // ===== Item States =====
    /// Checking an item against the dedup set
    CheckDedup,

    /// Waiting for an item's detail document
    FetchingItem,

    /// Running the field pipeline
    ExtractingFields,

    /// Running the reward pipeline
    ExtractingRewards,

    /// Appending a finished record to the result
    Accumulating,

    /// Politeness pause before the next network call
    RateLimiting,

    // ===== Terminal States =====
    /// Quota reached or feed exhausted
    Completed,

    /// A page could not be fetched
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if the crawl loop may move from `self` to `next`
    ///
    /// Failure edges (`FetchingItem`, `ExtractingFields` and
    /// `ExtractingRewards` straight to `RateLimiting`) are the per-item
    /// failure boundary: the item is dropped and the run carries on.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        match self {
            Discovering => matches!(next, FetchingPage | Completed),
            FetchingPage => matches!(next, CheckDedup | RateLimiting | Completed | Aborted),
            CheckDedup => matches!(next, CheckDedup | FetchingItem | RateLimiting),
            FetchingItem => matches!(next, ExtractingFields | RateLimiting),
            ExtractingFields => matches!(next, ExtractingRewards | RateLimiting),
            ExtractingRewards => matches!(next, Accumulating | RateLimiting),
            Accumulating => matches!(next, RateLimiting | Completed),
            RateLimiting => matches!(next, CheckDedup | Discovering | Completed),
            Completed | Aborted => false,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discovering => "discovering",
            Self::FetchingPage => "fetching_page",
            Self::CheckDedup => "check_dedup",
            Self::FetchingItem => "fetching_item",
            Self::ExtractingFields => "extracting_fields",
            Self::ExtractingRewards => "extracting_rewards",
            Self::Accumulating => "accumulating",
            Self::RateLimiting => "rate_limiting",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReason {
    /// The requested number of records was collected
    QuotaReached,

    /// The feed returned an empty page
    FeedExhausted,

    /// Too many consecutive pages added no record
    StalePages { pages: u32 },

    /// A discovery page could not be fetched
    Aborted { page: u32, error: String },
}

impl CompletionReason {
    /// The terminal state matching this reason
    pub fn final_state(&self) -> CrawlState {
        match self {
            Self::Aborted { .. } => CrawlState::Aborted,
            _ => CrawlState::Completed,
        }
    }
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotaReached => write!(f, "quota reached"),
            Self::FeedExhausted => write!(f, "feed exhausted"),
            Self::StalePages { pages } => {
                write!(f, "{} consecutive pages without new records", pages)
            }
            Self::Aborted { page, error } => write!(f, "aborted on page {}: {}", page, error),
        }
    }
}
