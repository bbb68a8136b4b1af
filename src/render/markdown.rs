//! Markdown renderer implementation.

use super::RenderOptions;
use crate::error::Result;
use crate::model::{Document, Fragment, FragmentKind, Page};

/// Markdown renderer.
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document to Markdown string.
    pub fn render(&self, document: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            self.render_frontmatter(document, &mut output);
        }

        for (index, page) in document.pages.iter().enumerate() {
            self.render_page(page, index, &mut output);
        }

        // Single trailing newline
        let trimmed = output.trim_end_matches('\n').len();
        output.truncate(trimmed);
        if !output.is_empty() {
            output.push('\n');
        }

        Ok(output)
    }

    /// Renders YAML frontmatter.
    fn render_frontmatter(&self, document: &Document, output: &mut String) {
        output.push_str("---\n");

        if let Some(ref title) = document.metadata.title {
            output.push_str(&format!("title: \"{}\"\n", escape_yaml(title)));
        }
        if let Some(ref source) = document.metadata.source {
            output.push_str(&format!("source: \"{}\"\n", escape_yaml(source)));
        }
        if let Some(max_page) = document.max_page() {
            output.push_str(&format!("pages: {}\n", max_page));
        }

        output.push_str("---\n\n");
    }

    fn render_page(&self, page: &Page, index: usize, output: &mut String) {
        if self.options.page_headings {
            let number = page.number.map_or(index + 1, |n| n as usize);
            output.push_str(&format!("## Page {}\n\n", number));
        }

        let mut previous: Option<FragmentKind> = None;
        for fragment in &page.fragments {
            if fragment.is_blank() && !self.options.include_empty_fragments {
                continue;
            }

            // A list ends where a paragraph starts
            if previous == Some(FragmentKind::ListItem)
                && fragment.kind == FragmentKind::Paragraph
                && self.options.paragraph_spacing
            {
                output.push('\n');
            }

            self.render_fragment(fragment, output);
            previous = Some(fragment.kind);
        }

        if previous == Some(FragmentKind::ListItem) || !self.options.paragraph_spacing {
            output.push('\n');
        }
    }

    fn render_fragment(&self, fragment: &Fragment, output: &mut String) {
        let text = fragment.text.trim();
        let text = if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        };

        match fragment.kind {
            FragmentKind::ListItem => {
                output.push(self.options.list_marker);
                output.push(' ');
                output.push_str(&text);
                output.push('\n');
            }
            FragmentKind::Paragraph => {
                output.push_str(&text);
                output.push('\n');
                if self.options.paragraph_spacing {
                    output.push('\n');
                }
            }
        }
    }
}

/// Escapes special Markdown characters.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.'
            | '!' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Escapes special characters for YAML strings.
fn escape_yaml(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
