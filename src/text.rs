//! Plain-text input.
//!
//! Pages are separated by form feeds (`\f`), which is what most text
//! extractors emit between pages. Each non-empty line becomes one fragment;
//! lines opening with a bullet or list number become list items.

use crate::model::{Document, Fragment, FragmentKind, Page};
use crate::parse_options::ParseOptions;
use regex::Regex;
use std::sync::LazyLock;

static RE_LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[•\-*]+|[0-9]+\s*[.)])\s+\S").unwrap());

/// Page separator in plain-text input.
pub const PAGE_BREAK: char = '\u{000C}';

/// Parses plain text into a document, numbering pages from 1.
///
/// Text input has no structure that can be malformed, so `options` only
/// matter for the other formats; the parameter keeps loaders uniform.
pub fn parse_text(text: &str, _options: &ParseOptions) -> Document {
    let pages = text
        .split(PAGE_BREAK)
        .enumerate()
        .map(|(index, chunk)| parse_page(chunk, index as u32 + 1))
        .collect();

    let mut document = Document::from_pages(pages);
    document.metadata.max_page = u32::try_from(document.page_count()).ok();
    document
}

// Blank lines only separate fragments in text input, so they are never kept.
fn parse_page(chunk: &str, number: u32) -> Page {
    let mut page = Page::numbered(number);
    page.fragments = chunk
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Fragment::new(line_kind(line), line.trim_end()))
        .collect();
    page
}

fn line_kind(line: &str) -> FragmentKind {
    if RE_LIST_MARKER.is_match(line) {
        FragmentKind::ListItem
    } else {
        FragmentKind::Paragraph
    }
}
