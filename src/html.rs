//! Viewer HTML input.
//!
//! The viewer lays out one container per page (`<div class="page" id="p12">`)
//! holding `<p>` and `<li>` elements. Fragments are collected in document
//! order; their text is the concatenated text of every descendant node.

use crate::error::{Error, Result};
use crate::model::{parse_page_id, Document, Fragment, FragmentKind, Metadata, Page};
use crate::parse_options::ParseOptions;
use scraper::{ElementRef, Html, Selector};

/// Body attribute carrying the declared page count.
const MAX_PAGE_ATTR: &str = "data-max-page";

/// Parses viewer HTML into a document.
///
/// In strict mode a document without any page container is an error. In
/// lenient mode every fragment of the document is gathered into one page.
pub fn parse_html(html: &str, options: &ParseOptions) -> Result<Document> {
    let page_selector = selector(&options.page_selector)?;
    let fragment_selector = selector(&options.fragment_selector)?;
    let dom = Html::parse_document(html);

    let mut pages: Vec<Page> = dom
        .select(&page_selector)
        .map(|element| parse_page(element, &fragment_selector, options))
        .collect();

    if pages.is_empty() {
        if !options.is_lenient() {
            return Err(Error::MissingComponent(format!(
                "no page matches selector '{}'",
                options.page_selector
            )));
        }
        tracing::debug!(
            selector = %options.page_selector,
            "no page containers found, collecting fragments into a single page"
        );
        let mut page = Page::new();
        page.fragments = collect_fragments(dom.root_element(), &fragment_selector, options);
        pages.push(page);
    }

    let document = Document {
        metadata: parse_metadata(&dom),
        pages,
    };
    tracing::debug!(
        pages = document.page_count(),
        fragments = document.fragment_count(),
        "parsed viewer HTML"
    );
    Ok(document)
}

fn selector(source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|e| Error::Html(format!("invalid selector '{}': {}", source, e)))
}

fn parse_page(element: ElementRef<'_>, fragments: &Selector, options: &ParseOptions) -> Page {
    let id = element.value().id().map(str::to_string);
    Page {
        number: id.as_deref().and_then(parse_page_id),
        id,
        fragments: collect_fragments(element, fragments, options),
    }
}

fn collect_fragments(
    scope: ElementRef<'_>,
    fragments: &Selector,
    options: &ParseOptions,
) -> Vec<Fragment> {
    scope
        .select(fragments)
        .map(|element| {
            let kind = FragmentKind::from_tag(element.value().name()).unwrap_or_default();
            Fragment::new(kind, element.text().collect::<String>())
        })
        .filter(|fragment| options.keep_blank_fragments || !fragment.is_blank())
        .collect()
}

fn parse_metadata(dom: &Html) -> Metadata {
    let mut metadata = Metadata::default();

    if let Ok(title) = Selector::parse("title") {
        if let Some(element) = dom.select(&title).next() {
            let text = element.text().collect::<String>();
            let text = text.trim();
            if !text.is_empty() {
                metadata.title = Some(text.to_string());
            }
        }
    }

    if let Ok(body) = Selector::parse("body") {
        metadata.max_page = dom
            .select(&body)
            .next()
            .and_then(|element| element.value().attr(MAX_PAGE_ATTR))
            .and_then(|value| value.trim().parse().ok());
    }

    metadata
}
