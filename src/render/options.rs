//! Rendering options.

/// Default class attribute of page containers in HTML output.
pub const DEFAULT_PAGE_CLASS: &str = "page";

/// Options for rendering cleaned documents.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Whether to include metadata as YAML frontmatter (Markdown) or a
    /// `<head>` block (HTML).
    pub include_frontmatter: bool,

    /// Whether to emit a heading before each page.
    pub page_headings: bool,

    /// Character to use for list items in Markdown.
    /// Default: '-'
    pub list_marker: char,

    /// Whether to add blank lines between paragraphs.
    pub paragraph_spacing: bool,

    /// Whether to escape special Markdown characters in text.
    pub escape_special_chars: bool,

    /// Whether to include fragments with no visible text.
    pub include_empty_fragments: bool,

    /// Class attribute of page containers in HTML output.
    pub html_page_class: String,

    /// Whether HTML output is a complete document or only the page sections.
    pub html_standalone: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            page_headings: false,
            list_marker: '-',
            paragraph_spacing: true,
            escape_special_chars: false,
            include_empty_fragments: false,
            html_page_class: DEFAULT_PAGE_CLASS.to_string(),
            html_standalone: true,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables frontmatter output.
    pub fn with_frontmatter(mut self) -> Self {
        self.include_frontmatter = true;
        self
    }

    /// Emits a heading before each page.
    pub fn with_page_headings(mut self) -> Self {
        self.page_headings = true;
        self
    }

    /// Sets the Markdown list marker.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Sets the class attribute of HTML page containers.
    pub fn with_page_class(mut self, class: impl Into<String>) -> Self {
        self.html_page_class = class.into();
        self
    }

    /// Renders HTML page sections without the surrounding document.
    pub fn html_fragment_only(mut self) -> Self {
        self.html_standalone = false;
        self
    }

    /// Disables paragraph spacing.
    pub fn without_paragraph_spacing(mut self) -> Self {
        self.paragraph_spacing = false;
        self
    }
}
