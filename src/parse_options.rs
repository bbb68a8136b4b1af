//! Options for loading documents.

/// Default CSS selector for page containers.
pub const DEFAULT_PAGE_SELECTOR: &str = ".page";

/// Default CSS selector for text fragments within a page.
pub const DEFAULT_FRAGMENT_SELECTOR: &str = "p, li";

/// Options for controlling document loading.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// How to handle structural problems in the input.
    pub error_mode: ErrorMode,

    /// CSS selector matching page containers (HTML input).
    pub page_selector: String,

    /// CSS selector matching fragments inside a page (HTML input).
    pub fragment_selector: String,

    /// Whether to keep fragments whose text is empty after trimming (HTML input).
    pub keep_blank_fragments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            page_selector: DEFAULT_PAGE_SELECTOR.to_string(),
            fragment_selector: DEFAULT_FRAGMENT_SELECTOR.to_string(),
            keep_blank_fragments: true,
        }
    }
}

impl ParseOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets lenient error handling (fall back instead of failing).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (fail on any structural problem).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Sets the page container selector.
    pub fn with_page_selector(mut self, selector: impl Into<String>) -> Self {
        self.page_selector = selector.into();
        self
    }

    /// Sets the fragment selector.
    pub fn with_fragment_selector(mut self, selector: impl Into<String>) -> Self {
        self.fragment_selector = selector.into();
        self
    }

    /// Skips fragments with no visible text while loading.
    pub fn skip_blank_fragments(mut self) -> Self {
        self.keep_blank_fragments = false;
        self
    }

    /// Returns true if problems should be worked around where possible.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }
}

/// How to handle structural problems in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail immediately.
    #[default]
    Strict,
    /// Fall back to a best-effort structure and continue.
    Lenient,
}
