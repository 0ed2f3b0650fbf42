use crate::UrlError;
use url::Url;

/// Tracking query parameters removed during canonicalization
const TRACKING_PARAMS: &[&str] = &["ref", "fbclid", "gclid", "mc_eid"];

/// Tracking parameter prefixes (`ref_page`, `utm_source`, ...)
const TRACKING_PREFIXES: &[&str] = &["ref_", "utm_"];

/// Canonicalizes an item URL taken from the discovery feed
///
/// The result is both the `url` field of the record and the identifier used
/// for deduplication, so two feed entries pointing at the same project with
/// different referral suffixes collapse to one.
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme and a host
/// 3. Remove the fragment
/// 4. Remove tracking query parameters (`ref`, `ref_*`, `utm_*`, click ids)
/// 5. Sort remaining query parameters by key
/// 6. Remove an empty query string
///
/// # Examples
///
/// ```
/// use pledge_harvest::url::canonical_item_url;
///
/// let url = canonical_item_url(
///     "https://www.kickstarter.com/projects/maker/gadget?ref=discovery_category",
/// )
/// .unwrap();
/// assert_eq!(url.as_str(), "https://www.kickstarter.com/projects/maker/gadget");
/// ```
pub fn canonical_item_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept = filter_and_sort_query_params(&url);

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || TRACKING_PREFIXES.iter().any(|p| key.starts_with(p))
}
