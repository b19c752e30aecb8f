//! Download-link resolution from the warehouse landing page.
//!
//! The warehouse README links the full config bundle behind a fixed
//! phrase. Resolution is two ordered strategies, each pure (HTML string
//! in, optional URL out) so they can be tested without network access:
//!
//! 1. anchors whose enclosing element's text contains [`SEARCH_PHRASE`];
//! 2. fallback: text nodes containing a case-insensitive
//!    [`FALLBACK_PHRASE`], taking the first anchor under the node's
//!    parent.
//!
//! Absence is not an error here; the pipeline treats `None` as fatal.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Phrase the warehouse README places next to the bundle link.
pub const SEARCH_PHRASE: &str = "To download all configs click here";

/// Lowercase substring used by the fallback text-node scan.
pub const FALLBACK_PHRASE: &str = "download all configs";

/// Resolve the bundle download URL from the page HTML.
///
/// Returns the first anchor `href` found by either strategy, resolved
/// against `page_url`, or `None` when neither strategy matches.
#[must_use]
pub fn resolve_download_url(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").expect("anchor selector is valid");

    anchor_near_phrase(&document, &anchor_sel, page_url)
        .or_else(|| anchor_after_text_match(&document, &anchor_sel, page_url))
}

/// Strategy 1: an anchor whose parent element's text contains the phrase.
fn anchor_near_phrase(
    document: &Html,
    anchor_sel: &Selector,
    page_url: &str,
) -> Option<String> {
    for anchor in document.select(anchor_sel) {
        let Some(parent) = anchor.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let parent_text: String = parent.text().collect();
        if !parent_text.contains(SEARCH_PHRASE) {
            continue;
        }
        if let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_href(page_url, href))
        {
            return Some(url);
        }
    }
    None
}

/// Strategy 2: scan text nodes for a case-insensitive phrase match and
/// take the first anchor under the matching node's parent.
fn anchor_after_text_match(
    document: &Html,
    anchor_sel: &Selector,
    page_url: &str,
) -> Option<String> {
    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        if !text.to_lowercase().contains(FALLBACK_PHRASE) {
            continue;
        }
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if let Some(url) = parent
            .select(anchor_sel)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .and_then(|href| resolve_href(page_url, href))
        {
            return Some(url);
        }
    }
    None
}

/// Resolve `href` against the page URL; invalid candidates are skipped.
fn resolve_href(page_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}
