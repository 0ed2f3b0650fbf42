//! Detail document parsing and querying
//!
//! This module wraps a fetched project page and provides:
//! - First-match CSS queries and element text
//! - Plain-text rendering of the whole page
//! - Splitting the page into reward blocks for the reward pipeline

use crate::{ExtractError, ExtractResult};
use htmd::HtmlToMarkdown;
use scraper::{ElementRef, Html, Selector};

/// Selector of one pledge/reward block
pub const PLEDGE_BLOCK_SELECTOR: &str = "div.pledge__info";

/// Elements dropped entirely from the plain-text rendering
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// A fetched project page: raw text plus its parsed tree
#[derive(Debug)]
pub struct DetailDocument {
    raw: String,
    html: Html,
}

impl DetailDocument {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let html = Html::parse_document(&raw);
        Self { raw, html }
    }

    /// The page exactly as fetched
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// First element matching `css` in document order, if any
    pub fn select_first(&self, css: &str) -> ExtractResult<Option<ElementRef<'_>>> {
        first_match(&self.html, css)
    }

    /// Like [`select_first`](Self::select_first), but absence is an error
    pub fn require(&self, css: &str) -> ExtractResult<ElementRef<'_>> {
        require_match(&self.html, css)
    }

    /// Readable text of the page with markup, scripts and styles removed
    ///
    /// Rendered from the raw page as Markdown-flavoured text, so headings,
    /// table cells and images keep their boundaries.
    pub fn plain_text(&self) -> ExtractResult<String> {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(SKIPPED_TAGS.to_vec())
            .build();

        converter
            .convert(&self.raw)
            .map(|text| text.trim().to_string())
            .map_err(|e| ExtractError::MalformedData {
                value: format!("{} bytes of HTML", self.raw.len()),
                reason: format!("HTML to text conversion failed: {}", e),
            })
    }

    /// Every pledge block except the first one in document order
    ///
    /// The first block is the "pledge without a reward" option; it is dropped
    /// by position, never by content, so zero or one block yields nothing.
    pub fn reward_blocks(&self) -> ExtractResult<Vec<RewardBlock>> {
        let selector = parse_selector(PLEDGE_BLOCK_SELECTOR)?;

        Ok(self
            .html
            .select(&selector)
            .enumerate()
            .skip(1)
            .map(|(position, element)| RewardBlock::new(position, &element.html()))
            .collect())
    }
}

/// One reward block, re-parsed on its own so it can outlive the page query
#[derive(Debug)]
pub struct RewardBlock {
    position: usize,
    html: Html,
}

impl RewardBlock {
    /// Parses a block from its outer HTML; `position` is its index among all
    /// pledge blocks of the page
    pub fn new(position: usize, outer_html: &str) -> Self {
        Self {
            position,
            html: Html::parse_fragment(outer_html),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn select_first(&self, css: &str) -> ExtractResult<Option<ElementRef<'_>>> {
        first_match(&self.html, css)
    }

    pub fn require(&self, css: &str) -> ExtractResult<ElementRef<'_>> {
        require_match(&self.html, css)
    }
}

/// Concatenated text of an element and its descendants, trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        css: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn first_match<'a>(html: &'a Html, css: &str) -> ExtractResult<Option<ElementRef<'a>>> {
    let selector = parse_selector(css)?;
    Ok(html.select(&selector).next())
}

fn require_match<'a>(html: &'a Html, css: &str) -> ExtractResult<ElementRef<'a>> {
    first_match(html, css)?.ok_or_else(|| ExtractError::MissingElement {
        selector: css.to_string(),
    })
}
