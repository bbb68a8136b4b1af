//! Page and fragment definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a text-bearing leaf element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Paragraph (`<p>`)
    #[default]
    Paragraph,
    /// List item (`<li>`)
    ListItem,
}

impl FragmentKind {
    /// Returns the element tag name used in canonical keys.
    pub fn tag(self) -> &'static str {
        match self {
            FragmentKind::Paragraph => "P",
            FragmentKind::ListItem => "LI",
        }
    }

    /// Maps an HTML element name to a fragment kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("p") {
            Some(FragmentKind::Paragraph)
        } else if tag.eq_ignore_ascii_case("li") {
            Some(FragmentKind::ListItem)
        } else {
            None
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single paragraph or list item within a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Element kind
    #[serde(default)]
    pub kind: FragmentKind,
    /// Raw text content
    pub text: String,
}

impl Fragment {
    /// Creates a new fragment.
    pub fn new(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates a paragraph fragment.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::Paragraph, text)
    }

    /// Creates a list item fragment.
    pub fn list_item(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::ListItem, text)
    }

    /// Returns true if the fragment holds no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One logical document page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-based) when known
    #[serde(default)]
    pub number: Option<u32>,
    /// Element id in the viewer markup (e.g. `p12`)
    #[serde(default)]
    pub id: Option<String>,
    /// Fragments in document order
    #[serde(default)]
    pub fragments: Vec<Fragment>,
}

impl Page {
    /// Creates a new empty page without a number.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty page with the viewer's `p<number>` id.
    pub fn numbered(number: u32) -> Self {
        Self {
            number: Some(number),
            id: Some(format!("p{}", number)),
            fragments: Vec::new(),
        }
    }

    /// Adds a paragraph fragment.
    pub fn push_paragraph(&mut self, text: impl Into<String>) {
        self.fragments.push(Fragment::paragraph(text));
    }

    /// Adds a list item fragment.
    pub fn push_list_item(&mut self, text: impl Into<String>) {
        self.fragments.push(Fragment::list_item(text));
    }

    /// Builder-style variant of [`Page::push_paragraph`].
    pub fn with_paragraph(mut self, text: impl Into<String>) -> Self {
        self.push_paragraph(text);
        self
    }

    /// Builder-style variant of [`Page::push_list_item`].
    pub fn with_list_item(mut self, text: impl Into<String>) -> Self {
        self.push_list_item(text);
        self
    }

    /// Returns true if the page has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the page text, one fragment per line.
    pub fn plain_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns a label for diagnostics: the number, the id, or `?`.
    pub fn label(&self) -> String {
        match (self.number, self.id.as_deref()) {
            (Some(n), _) => n.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "?".to_string(),
        }
    }
}

/// Parses a viewer page id of the form `p<digits>` into a page number.
pub fn parse_page_id(id: &str) -> Option<u32> {
    let digits = id.strip_prefix('p')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_kind_tags() {
        assert_eq!(FragmentKind::Paragraph.tag(), "P");
        assert_eq!(FragmentKind::ListItem.tag(), "LI");
        assert_eq!(FragmentKind::from_tag("li"), Some(FragmentKind::ListItem));
        assert_eq!(FragmentKind::from_tag("P"), Some(FragmentKind::Paragraph));
        assert_eq!(FragmentKind::from_tag("div"), None);
    }

    #[test]
    fn test_parse_page_id() {
        assert_eq!(parse_page_id("p1"), Some(1));
        assert_eq!(parse_page_id("p074"), Some(74));
        assert_eq!(parse_page_id("p"), None);
        assert_eq!(parse_page_id("page1"), None);
        assert_eq!(parse_page_id("p1a"), None);
        assert_eq!(parse_page_id("q1"), None);
    }

    #[test]
    fn test_page_builders() {
        let page = Page::numbered(3)
            .with_paragraph("First")
            .with_list_item("Second");

        assert_eq!(page.number, Some(3));
        assert_eq!(page.id.as_deref(), Some("p3"));
        assert_eq!(page.fragments.len(), 2);
        assert_eq!(page.fragments[1].kind, FragmentKind::ListItem);
        assert_eq!(page.plain_text(), "First\nSecond");
    }

    #[test]
    fn test_page_label() {
        assert_eq!(Page::numbered(7).label(), "7");
        assert_eq!(Page::new().label(), "?");
    }

    #[test]
    fn test_fragment_json_defaults_kind() {
        let fragment: Fragment = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(fragment.kind, FragmentKind::Paragraph);

        let item: Fragment = serde_json::from_str(r#"{"kind":"list_item","text":"x"}"#).unwrap();
        assert_eq!(item.kind, FragmentKind::ListItem);
    }
}
