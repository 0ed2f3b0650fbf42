//! Per-item extraction context and the record id sequence

use crate::extract::document::DetailDocument;
use crate::feed::FeedItem;
use chrono::NaiveDateTime;
use url::Url;

/// Everything the field extractors may look at for one item
///
/// Built after the detail document arrives and dropped as soon as the item's
/// record (or failure) is known.
#[derive(Debug)]
pub struct ExtractionContext {
    /// Id reserved for this item before any field is resolved
    pub id: u64,

    /// Canonical item URL
    pub url: Url,

    /// The feed entry the item came from
    pub item: FeedItem,

    /// The item's fetched page
    pub document: DetailDocument,

    /// Local wall-clock time captured for this item
    pub now: NaiveDateTime,
}

/// Monotonic record id counter owned by the coordinator
///
/// An id is reserved for every attempted extraction and committed only when
/// the record is accumulated, so emitted ids run 0, 1, 2, ... without gaps
/// even when some items fail.
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next accumulated record will carry
    pub fn reserve(&self) -> u64 {
        self.next
    }

    /// Consumes the reserved id
    pub fn commit(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids committed so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}
