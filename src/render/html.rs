//! HTML renderer.
//!
//! Output mirrors the viewer markup: one `<section>` per page carrying the
//! page class and the `p<number>` id, paragraphs as `<p>`, and runs of list
//! items grouped in a `<ul>`. The result loads back through
//! [`crate::html::parse_html`] with default options.

use super::RenderOptions;
use crate::error::Result;
use crate::model::{Document, FragmentKind, Page};

/// HTML renderer.
#[derive(Debug)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document to an HTML string.
    pub fn render(&self, document: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.html_standalone {
            output.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
            if let Some(ref title) = document.metadata.title {
                output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
            }
            output.push_str("</head>\n");
            match document.metadata.max_page {
                Some(max_page) => {
                    output.push_str(&format!("<body data-max-page=\"{}\">\n", max_page))
                }
                None => output.push_str("<body>\n"),
            }
        }

        for page in &document.pages {
            self.render_page(page, &mut output);
        }

        if self.options.html_standalone {
            output.push_str("</body>\n</html>\n");
        }

        Ok(output)
    }

    fn render_page(&self, page: &Page, output: &mut String) {
        output.push_str(&format!(
            "<section class=\"{}\"",
            escape_html(&self.options.html_page_class)
        ));
        if let Some(ref id) = page.id {
            output.push_str(&format!(" id=\"{}\"", escape_html(id)));
        }
        output.push_str(">\n");

        let mut in_list = false;
        for fragment in &page.fragments {
            if fragment.is_blank() && !self.options.include_empty_fragments {
                continue;
            }

            let is_item = fragment.kind == FragmentKind::ListItem;
            if is_item && !in_list {
                output.push_str("<ul>\n");
            } else if !is_item && in_list {
                output.push_str("</ul>\n");
            }
            in_list = is_item;

            let tag = if is_item { "li" } else { "p" };
            output.push_str(&format!(
                "<{}>{}</{}>\n",
                tag,
                escape_html(fragment.text.trim()),
                tag
            ));
        }
        if in_list {
            output.push_str("</ul>\n");
        }

        output.push_str("</section>\n");
    }
}

/// Escapes text for use in HTML content and attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(ch),
        }
    }

    result
}
