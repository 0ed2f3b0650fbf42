//! Run-scoped set of item identifiers already handled

use std::collections::HashSet;
use url::Url;

/// Remembers every canonical item URL the crawl has committed to
///
/// Entries are never evicted; the set lives exactly as long as one run.
#[derive(Debug, Clone, Default)]
pub struct DedupTracker {
    seen: HashSet<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `id` was marked earlier in this run
    pub fn seen(&self, id: &Url) -> bool {
        self.seen.contains(id.as_str())
    }

    /// Records `id`; returns false if it was already present
    pub fn mark(&mut self, id: &Url) -> bool {
        self.seen.insert(id.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonical_item_url;

    #[test]
    fn test_mark_then_seen() {
        let mut tracker = DedupTracker::new();
        let url = Url::parse("https://example.com/projects/a/b").unwrap();

        assert!(!tracker.seen(&url));
        assert!(tracker.mark(&url));
        assert!(tracker.seen(&url));
        assert!(!tracker.mark(&url));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_referral_variants_collapse() {
        let mut tracker = DedupTracker::new();
        let first =
            canonical_item_url("https://example.com/projects/a/b?ref=discovery_category").unwrap();
        let second =
            canonical_item_url("https://example.com/projects/a/b?ref=category_newest#faq").unwrap();

        tracker.mark(&first);
        assert!(tracker.seen(&second));
    }

    #[test]
    fn test_distinct_projects_are_distinct() {
        let mut tracker = DedupTracker::new();
        tracker.mark(&Url::parse("https://example.com/projects/a/b").unwrap());
        assert!(!tracker.seen(&Url::parse("https://example.com/projects/a/c").unwrap()));
        assert!(!tracker.is_empty());
    }
}
