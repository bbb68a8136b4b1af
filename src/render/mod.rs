//! Rendering of cleaned documents to Markdown, HTML and plain text.

mod html;
mod markdown;
mod options;

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;
pub use options::{RenderOptions, DEFAULT_PAGE_CLASS};

use crate::error::{Error, Result};
use crate::model::Document;
use std::io::Write;
use std::path::Path;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown
    Markdown,
    /// Viewer-style HTML
    Html,
    /// Plain text, pages separated by form feeds
    Text,
}

impl OutputFormat {
    /// Returns the conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
        }
    }

    /// Picks a format from a file path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("md") | Some("markdown") => Ok(OutputFormat::Markdown),
            Some("html") | Some("htm") => Ok(OutputFormat::Html),
            Some("txt") | Some("text") => Ok(OutputFormat::Text),
            _ => Err(Error::InvalidOption(format!(
                "cannot infer output format from '{}'",
                path.as_ref().display()
            ))),
        }
    }
}

/// Renders a document to Markdown.
pub fn render_markdown(document: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(document)
}

/// Renders a document to viewer-style HTML.
pub fn render_html(document: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = HtmlRenderer::new(options.clone());
    renderer.render(document)
}

/// Renders a document to plain text.
///
/// Pages are separated by form feeds, so the output loads back through
/// [`crate::text::parse_text`].
pub fn render_text(document: &Document, options: &RenderOptions) -> Result<String> {
    let mut output = document
        .pages
        .iter()
        .map(|page| {
            page.fragments
                .iter()
                .filter(|f| options.include_empty_fragments || !f.is_blank())
                .map(|f| f.text.trim())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\u{000C}\n");

    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

/// Renders a document in the given format.
pub fn render(document: &Document, format: OutputFormat, options: &RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Markdown => render_markdown(document, options),
        OutputFormat::Html => render_html(document, options),
        OutputFormat::Text => render_text(document, options),
    }
}

/// Renders a document and writes to a file, choosing the format from the
/// file extension.
pub fn render_to_file(
    document: &Document,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let path = path.as_ref();
    let content = render(document, OutputFormat::from_path(path)?, options)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Renders a document and writes to a writer.
pub fn render_to_writer<W: Write>(
    document: &Document,
    writer: &mut W,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<()> {
    let content = render(document, format, options)?;
    writer.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    fn sample() -> Document {
        Document::from_pages(vec![
            Page::numbered(1).with_paragraph("One").with_paragraph(" "),
            Page::numbered(2).with_list_item("- Two"),
        ])
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(
            OutputFormat::from_path("out/clean.MD").unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!(
            OutputFormat::from_path("clean.htm").unwrap(),
            OutputFormat::Html
        );
        assert!(matches!(
            OutputFormat::from_path("clean.pdf"),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample(), &RenderOptions::default()).unwrap();
        assert_eq!(text, "One\n\u{000C}\n- Two\n");
    }

    #[test]
    fn test_render_text_loads_back() {
        let text = render_text(&sample(), &RenderOptions::default()).unwrap();
        let doc = crate::text::parse_text(&text, &crate::parse_options::ParseOptions::default());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].fragments.len(), 1);
        assert_eq!(doc.pages[1].fragments[0].text, "- Two");
    }

    #[test]
    fn test_render_to_file_and_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.md");
        render_to_file(&sample(), &path, &RenderOptions::default()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("One"));

        let mut buffer = Vec::new();
        render_to_writer(
            &sample(),
            &mut buffer,
            OutputFormat::Html,
            &RenderOptions::default().html_fragment_only(),
        )
        .unwrap();
        assert!(String::from_utf8(buffer)
            .unwrap()
            .starts_with("<section class=\"page\" id=\"p1\">"));
    }
}
