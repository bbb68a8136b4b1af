//! # unartifact
//!
//! Removes extraction artifacts from paginated documents rendered as HTML or
//! text: garbage fragments, noise glyphs, page-local repeated lines and bare
//! math notation.
//!
//! ## Supported Inputs
//!
//! - **Viewer HTML**: page containers (`.page`, id `p<number>`) holding `<p>`
//!   and `<li>` elements (with the `html` feature)
//! - **JSON**: a serialized [`Document`]
//! - **Text**: pages separated by form feeds
//!
//! ## Quick Start
//!
//! ```no_run
//! use unartifact::{clean_file, CleanupOptions, RenderOptions};
//!
//! fn main() -> unartifact::Result<()> {
//!     let (document, report) = clean_file("viewer.html", &CleanupOptions::default())?;
//!
//!     let markdown = unartifact::render::render_markdown(&document, &RenderOptions::default())?;
//!     println!("{}", markdown);
//!     eprintln!("removed {} fragments", report.removed());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `html` (default): viewer HTML input
//! - `async`: Async I/O support with Tokio

pub mod cleanup;
pub mod detect;
pub mod error;
pub mod math;
pub mod model;
pub mod parse_options;
pub mod render;
pub mod scan;
pub mod text;

#[cfg(feature = "html")]
pub mod html;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::{
    clean_document, clean_page, fix_inline, normalize_key, should_drop, CleanupOptions,
    CleanupReport, PageReport,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{Document, Fragment, FragmentKind, Page};
pub use parse_options::{ErrorMode, ParseOptions};
pub use render::{OutputFormat, RenderOptions};
pub use scan::{PageScan, ScanOptions, ScanReport};

use std::path::Path;

/// Loads a document from a file path with default options.
///
/// The format is taken from the extension, or sniffed from the content.
///
/// # Example
///
/// ```no_run
/// use unartifact::load_file;
///
/// let document = load_file("viewer.html")?;
/// println!("Pages: {}", document.page_count());
/// # Ok::<(), unartifact::Error>(())
/// ```
pub fn load_file(path: impl AsRef<Path>) -> Result<Document> {
    load_file_with_options(path, &ParseOptions::default())
}

/// Loads a document from a file path with custom options.
pub fn load_file_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;
    let data = std::fs::read(path)?;

    let mut document = load_str(decode(&data)?, format, options)?;
    if document.metadata.source.is_none() {
        document.metadata.source = Some(path.display().to_string());
    }
    Ok(document)
}

/// Loads a document from bytes, sniffing the format.
pub fn load_bytes(data: &[u8], options: &ParseOptions) -> Result<Document> {
    let format = detect_format_from_bytes(data)?;
    load_str(decode(data)?, format, options)
}

/// Loads a document from text in a known format.
pub fn load_str(input: &str, format: FormatType, options: &ParseOptions) -> Result<Document> {
    tracing::debug!(%format, bytes = input.len(), "loading document");

    match format {
        #[cfg(feature = "html")]
        FormatType::Html => html::parse_html(input, options),
        #[cfg(not(feature = "html"))]
        FormatType::Html => Err(Error::UnsupportedFormat(
            "HTML input requires the 'html' feature".into(),
        )),
        FormatType::Json => Document::from_json(input),
        FormatType::Text => Ok(text::parse_text(input, options)),
    }
}

fn decode(data: &[u8]) -> Result<&str> {
    let data = data.strip_prefix(detect::UTF8_BOM).unwrap_or(data);
    Ok(std::str::from_utf8(data)?)
}

/// Loads and cleans a document file.
///
/// # Example
///
/// ```no_run
/// use unartifact::{clean_file, CleanupOptions};
///
/// let (document, report) = clean_file("viewer.html", &CleanupOptions::default())?;
/// println!("{} fragments kept, {} removed", report.kept, report.removed());
/// # Ok::<(), unartifact::Error>(())
/// ```
pub fn clean_file(
    path: impl AsRef<Path>,
    options: &CleanupOptions,
) -> Result<(Document, CleanupReport)> {
    options.validate()?;
    let mut document = load_file(path)?;
    let report = clean_document(&mut document, options);
    Ok((document, report))
}

/// Loads a document file and scans every page for leftover artifacts.
pub fn scan_file(path: impl AsRef<Path>, options: &ScanOptions) -> Result<Vec<PageScan>> {
    let document = load_file(path)?;
    Ok(scan::scan_document(&document, options))
}

/// Cleans a document file and renders it to Markdown with default options.
///
/// # Example
///
/// ```no_run
/// use unartifact::to_markdown;
///
/// let markdown = to_markdown("viewer.html")?;
/// std::fs::write("clean.md", markdown)?;
/// # Ok::<(), unartifact::Error>(())
/// ```
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    let (document, _) = clean_file(path, &CleanupOptions::default())?;
    render::render_markdown(&document, &RenderOptions::default())
}

/// Builder for loading, cleaning and rendering documents.
///
/// # Example
///
/// ```no_run
/// use unartifact::Unartifact;
///
/// let markdown = Unartifact::new()
///     .without_math()
///     .with_page_headings()
///     .clean("viewer.html")?
///     .to_markdown()?;
/// # Ok::<(), unartifact::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unartifact {
    cleanup_options: CleanupOptions,
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Unartifact {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cleanup options.
    pub fn with_cleanup(mut self, options: CleanupOptions) -> Self {
        self.cleanup_options = options;
        self
    }

    /// Replaces the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Leaves bare math notation unwrapped.
    pub fn without_math(mut self) -> Self {
        self.cleanup_options = self.cleanup_options.without_math_wrapping();
        self
    }

    /// Keeps repeated fragments.
    pub fn without_dedupe(mut self) -> Self {
        self.cleanup_options = self.cleanup_options.without_dedupe();
        self
    }

    /// Cleans pages in parallel.
    pub fn parallel(mut self) -> Self {
        self.cleanup_options = self.cleanup_options.parallel();
        self
    }

    /// Enables frontmatter in rendered output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options.include_frontmatter = true;
        self
    }

    /// Emits a heading before each page in Markdown output.
    pub fn with_page_headings(mut self) -> Self {
        self.render_options.page_headings = true;
        self
    }

    /// Sets lenient error handling (fall back when no pages are found).
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Loads and cleans a document from a file path.
    pub fn clean(self, path: impl AsRef<Path>) -> Result<CleanedDocument> {
        let document = load_file_with_options(path, &self.parse_options)?;
        self.clean_document(document)
    }

    /// Cleans an already loaded document.
    pub fn clean_document(self, mut document: Document) -> Result<CleanedDocument> {
        self.cleanup_options.validate()?;
        let report = clean_document(&mut document, &self.cleanup_options);
        Ok(CleanedDocument {
            document,
            report,
            render_options: self.render_options,
        })
    }
}

/// A cleaned document ready for rendering.
#[derive(Debug, Clone)]
pub struct CleanedDocument {
    document: Document,
    report: CleanupReport,
    render_options: RenderOptions,
}

impl CleanedDocument {
    /// Returns a reference to the underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns what the cleanup pass changed.
    pub fn report(&self) -> &CleanupReport {
        &self.report
    }

    /// Renders the document to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::render_markdown(&self.document, &self.render_options)
    }

    /// Renders the document to viewer-style HTML.
    pub fn to_html(&self) -> Result<String> {
        render::render_html(&self.document, &self.render_options)
    }

    /// Renders the document to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::render_text(&self.document, &self.render_options)
    }

    /// Serializes the document as JSON.
    pub fn to_json(&self) -> Result<String> {
        self.document.to_json()
    }

    /// Serializes the cleanup report as JSON.
    pub fn report_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.report)?)
    }

    /// Returns the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Consumes self and returns the underlying document and report.
    pub fn into_parts(self) -> (Document, CleanupReport) {
        (self.document, self.report)
    }
}
