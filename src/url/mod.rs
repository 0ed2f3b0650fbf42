//! URL handling module for Pledge-Harvest
//!
//! Item URLs from the discovery feed carry referral suffixes that change from
//! page to page; this module reduces them to a canonical form.

mod normalize;

pub use normalize::canonical_item_url;
