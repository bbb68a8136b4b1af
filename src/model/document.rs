//! Document structure and metadata.

use super::Page;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A paginated document as rendered by the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Pages in document order
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document from pages.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            metadata: Metadata::default(),
            pages,
        }
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the total number of fragments across all pages.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(|p| p.fragments.len()).sum()
    }

    /// Looks up a page by its number.
    pub fn page(&self, number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == Some(number))
    }

    /// Returns the highest page number, preferring the declared maximum.
    pub fn max_page(&self) -> Option<u32> {
        self.metadata
            .max_page
            .or_else(|| self.pages.iter().filter_map(|p| p.number).max())
    }

    /// Returns the plain text of the whole document.
    ///
    /// Pages are separated by a form feed so the text can be loaded back with
    /// [`crate::text::parse_text`].
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(Page::plain_text)
            .collect::<Vec<_>>()
            .join("\n\u{000C}\n")
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(default)]
    pub title: Option<String>,
    /// Where the document was loaded from
    #[serde(default)]
    pub source: Option<String>,
    /// Declared page count (`data-max-page` in the viewer)
    #[serde(default)]
    pub max_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_pages(vec![
            Page::numbered(1).with_paragraph("One"),
            Page::numbered(2)
                .with_paragraph("Two")
                .with_list_item("Three"),
        ])
    }

    #[test]
    fn test_counts() {
        let doc = sample();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.fragment_count(), 3);
        assert_eq!(doc.page(2).map(|p| p.fragments.len()), Some(2));
        assert!(doc.page(9).is_none());
    }

    #[test]
    fn test_max_page_prefers_metadata() {
        let mut doc = sample();
        assert_eq!(doc.max_page(), Some(2));
        doc.metadata.max_page = Some(74);
        assert_eq!(doc.max_page(), Some(74));
    }

    #[test]
    fn test_plain_text_page_separator() {
        let text = sample().plain_text();
        assert_eq!(text, "One\n\u{000C}\nTwo\nThree");
    }

    #[test]
    fn test_json_round_trip_keeps_structure() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"list_item\""));
        let back = Document::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_from_json_minimal() {
        let doc = Document::from_json(r#"{"pages":[{"fragments":[{"text":"a"}]}]}"#).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.metadata.title.is_none());
        assert!(doc.pages[0].number.is_none());
    }
}
