//! # Cleanup Pass
//!
//! Removes extraction artifacts from a paginated document, one page at a time.
//!
//! ## Per-fragment stages
//!
//! 1. **Drop** - short fragments carrying a known garbage signature are removed
//! 2. **Fix** - noise tokens stripped, repeated labels collapsed, math wrapped
//! 3. **Dedupe** - a fragment repeating one of the last six keys on the page is removed
//!
//! Fragments are processed in document order; all state is local to a page.

mod drop;
mod inline;
mod key;
mod window;

pub use drop::{matches_artifact, should_drop, ArtifactKind, DROP_MAX_CHARS};
pub use inline::{fix_inline, fix_text, InlineStep};
pub use key::{normalize_key, text_length, CanonicalKey};
pub use window::{RecentKeys, DEDUPE_MIN_CHARS, WINDOW_CAPACITY};

use crate::error::{Error, Result};
use crate::model::{Document, Fragment, Page};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Cleanup configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupOptions {
    /// Enable the drop filter
    pub drop_artifacts: bool,
    /// Enable inline rewriting
    pub fix_inline: bool,
    /// Wrap recognized math shapes (only when `fix_inline` is on)
    pub wrap_math: bool,
    /// Enable the sliding-window deduplicator
    pub deduplicate: bool,
    /// Fragments this long or longer are never dropped
    pub drop_max_chars: usize,
    /// Normalized texts shorter than this are never deduplicated
    pub dedupe_min_chars: usize,
    /// Process pages on the rayon thread pool
    pub parallel: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            drop_artifacts: true,
            fix_inline: true,
            wrap_math: true,
            deduplicate: true,
            drop_max_chars: DROP_MAX_CHARS,
            dedupe_min_chars: DEDUPE_MIN_CHARS,
            parallel: false,
        }
    }
}

impl CleanupOptions {
    /// Creates options with every stage enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for minimal cleanup (drop and noise stripping only)
    pub fn minimal() -> Self {
        Self {
            wrap_math: false,
            deduplicate: false,
            ..Self::default()
        }
    }

    /// Creates options that leave math notation as extracted.
    pub fn without_math() -> Self {
        Self {
            wrap_math: false,
            ..Self::default()
        }
    }

    /// Disables the deduplicator.
    pub fn without_dedupe(mut self) -> Self {
        self.deduplicate = false;
        self
    }

    /// Disables the drop filter.
    pub fn without_drop(mut self) -> Self {
        self.drop_artifacts = false;
        self
    }

    /// Disables math wrapping.
    pub fn without_math_wrapping(mut self) -> Self {
        self.wrap_math = false;
        self
    }

    /// Processes pages in parallel.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Loads options from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        if self.drop_artifacts && self.drop_max_chars == 0 {
            return Err(Error::InvalidOption(
                "drop_max_chars must be positive when drop_artifacts is enabled".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of the cleanup pass over one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageReport {
    /// Page number, if known
    pub page: Option<u32>,
    /// Fragments examined
    pub seen: usize,
    /// Fragments removed by the drop filter
    pub dropped: usize,
    /// Fragments whose text was rewritten
    pub rewritten: usize,
    /// Fragments removed as duplicates
    pub deduplicated: usize,
    /// Fragments left on the page
    pub kept: usize,
    /// Drop counts per signature
    pub drop_reasons: BTreeMap<ArtifactKind, usize>,
}

/// Outcome of the cleanup pass over a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Pages processed
    pub pages: usize,
    /// Fragments examined
    pub seen: usize,
    /// Fragments removed by the drop filter
    pub dropped: usize,
    /// Fragments whose text was rewritten
    pub rewritten: usize,
    /// Fragments removed as duplicates
    pub deduplicated: usize,
    /// Fragments left in the document
    pub kept: usize,
    /// Drop counts per signature
    pub drop_reasons: BTreeMap<ArtifactKind, usize>,
    /// Per-page details, in page order
    pub page_reports: Vec<PageReport>,
}

impl CleanupReport {
    /// Folds a page report into the totals.
    pub fn add_page(&mut self, page: PageReport) {
        self.pages += 1;
        self.seen += page.seen;
        self.dropped += page.dropped;
        self.rewritten += page.rewritten;
        self.deduplicated += page.deduplicated;
        self.kept += page.kept;
        for (kind, count) in &page.drop_reasons {
            *self.drop_reasons.entry(*kind).or_insert(0) += count;
        }
        self.page_reports.push(page);
    }

    /// Number of fragments removed for any reason.
    pub fn removed(&self) -> usize {
        self.dropped + self.deduplicated
    }

    /// Returns true if the pass changed anything.
    pub fn has_changes(&self) -> bool {
        self.removed() > 0 || self.rewritten > 0
    }
}

/// What happened to one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Dropped(ArtifactKind),
    Duplicate,
    Kept { rewritten: bool },
}

/// Per-page processing state. Created fresh for every page.
struct PageCleaner<'a> {
    options: &'a CleanupOptions,
    recent: RecentKeys,
}

impl<'a> PageCleaner<'a> {
    fn new(options: &'a CleanupOptions) -> Self {
        Self {
            options,
            recent: RecentKeys::new(),
        }
    }

    fn process(&mut self, fragment: &mut Fragment) -> Outcome {
        let raw = fragment.text.trim();

        if self.options.drop_artifacts {
            if let Some(kind) = should_drop(raw, self.options.drop_max_chars) {
                return Outcome::Dropped(kind);
            }
        }

        let mut rewritten = false;
        if self.options.fix_inline {
            let fixed = fix_text(raw, self.options.wrap_math);
            if fixed != raw {
                fragment.text = fixed;
                rewritten = true;
            }
        }

        if self.options.deduplicate {
            let key = CanonicalKey::of(fragment);
            let len = key.text_len();
            if len > 0 && len >= self.options.dedupe_min_chars && self.recent.contains(&key) {
                return Outcome::Duplicate;
            }
            self.recent.push(key);
        }

        Outcome::Kept { rewritten }
    }
}

/// Runs the cleanup pass over a single page.
///
/// Fragments are visited in order; removed fragments are dropped from
/// `page.fragments` and rewritten ones are updated in place.
pub fn clean_page(page: &mut Page, options: &CleanupOptions) -> PageReport {
    let mut report = PageReport {
        page: page.number,
        ..PageReport::default()
    };
    let mut cleaner = PageCleaner::new(options);
    let fragments = std::mem::take(&mut page.fragments);

    for mut fragment in fragments {
        report.seen += 1;
        match cleaner.process(&mut fragment) {
            Outcome::Dropped(kind) => {
                tracing::debug!(
                    page = %page.label(),
                    reason = %kind,
                    text = %fragment.text.trim(),
                    "dropped artifact fragment"
                );
                report.dropped += 1;
                *report.drop_reasons.entry(kind).or_insert(0) += 1;
            }
            Outcome::Duplicate => {
                tracing::debug!(
                    page = %page.label(),
                    kind = %fragment.kind,
                    text = %fragment.text,
                    "removed duplicate fragment"
                );
                report.deduplicated += 1;
            }
            Outcome::Kept { rewritten } => {
                if rewritten {
                    tracing::trace!(page = %page.label(), text = %fragment.text, "rewrote fragment");
                    report.rewritten += 1;
                }
                report.kept += 1;
                page.fragments.push(fragment);
            }
        }
    }

    report
}

/// Runs the cleanup pass over every page of a document.
///
/// Pages are independent; with `options.parallel` they are processed on the
/// rayon pool, each still sequentially with its own window.
pub fn clean_document(document: &mut Document, options: &CleanupOptions) -> CleanupReport {
    let page_reports: Vec<PageReport> = if options.parallel {
        document
            .pages
            .par_iter_mut()
            .map(|page| clean_page(page, options))
            .collect()
    } else {
        document
            .pages
            .iter_mut()
            .map(|page| clean_page(page, options))
            .collect()
    };

    let mut report = CleanupReport::default();
    for page in page_reports {
        report.add_page(page);
    }

    tracing::debug!(
        pages = report.pages,
        seen = report.seen,
        dropped = report.dropped,
        rewritten = report.rewritten,
        deduplicated = report.deduplicated,
        "cleanup pass complete"
    );

    report
}

/// Run cleanup with default options
pub fn clean_document_default(document: &mut Document) -> CleanupReport {
    clean_document(document, &CleanupOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FragmentKind;

    fn page_of(texts: &[&str]) -> Page {
        let mut page = Page::numbered(1);
        for text in texts {
            page.push_paragraph(*text);
        }
        page
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn test_duplicate_within_window_removed() {
        let mut page = page_of(&[
            "Alpha point.",
            "Beta point.",
            "Gamma.",
            "Delta.",
            "Epsilon.",
            "Zeta.",
            "Alpha point.",
        ]);
        let report = clean_page(&mut page, &CleanupOptions::default());

        assert_eq!(report.deduplicated, 1);
        assert_eq!(page.fragments.len(), 6);
        assert_eq!(texts(&page).last(), Some(&"Zeta."));
    }

    #[test]
    fn test_duplicate_beyond_window_kept() {
        let mut page = page_of(&[
            "Alpha point, first.",
            "Filler line one.",
            "Filler line two.",
            "Filler line three.",
            "Filler line four.",
            "Filler line five.",
            "Filler line six.",
            "Alpha point, first.",
        ]);
        let report = clean_page(&mut page, &CleanupOptions::default());

        assert_eq!(report.deduplicated, 0);
        assert_eq!(page.fragments.len(), 8);
    }

    #[test]
    fn test_duplicate_at_window_edge_removed() {
        // Five fragments between the repeats: the original is still the oldest entry
        let mut page = page_of(&[
            "Repeated header line",
            "one one one one",
            "two two two two",
            "three three three",
            "four four four four",
            "five five five five",
            "Repeated header line",
        ]);
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.deduplicated, 1);
    }

    #[test]
    fn test_short_fragments_never_deduplicated() {
        let mut page = page_of(&["Page 12", "Page 12", "•", "•", "Short one.", "Short one."]);
        let report = clean_page(&mut page, &CleanupOptions::default());

        assert_eq!(report.deduplicated, 0);
        assert_eq!(page.fragments.len(), 6);
    }

    #[test]
    fn test_duplicate_key_ignores_case_and_markers() {
        let mut page = Page::numbered(1);
        page.push_list_item("• The same list item text");
        page.push_list_item("THE SAME   list item text");
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.deduplicated, 1);
    }

    #[test]
    fn test_different_kinds_are_not_duplicates() {
        let mut page = Page::numbered(1);
        page.push_paragraph("A sentence long enough");
        page.push_list_item("A sentence long enough");
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.deduplicated, 0);
    }

    #[test]
    fn test_removed_duplicate_not_inserted() {
        // The removed repeat is not pushed, so the original ages out after
        // six more insertions.
        let mut page = page_of(&[
            "Header line repeated",
            "b b b b b b",
            "c c c c c c",
            "d d d d d d",
            "e e e e e e",
            "Header line repeated",
            "f f f f f f",
            "g g g g g g",
            "Header line repeated",
        ]);
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.deduplicated, 1);
        assert_eq!(page.fragments.len(), 8);
        assert_eq!(texts(&page).last(), Some(&"Header line repeated"));
    }

    #[test]
    fn test_window_is_per_page() {
        let mut doc = Document::from_pages(vec![
            page_of(&["Running header text"]),
            page_of(&["Running header text"]),
        ]);
        let report = clean_document(&mut doc, &CleanupOptions::default());
        assert_eq!(report.deduplicated, 0);
        assert_eq!(doc.fragment_count(), 2);
    }

    #[test]
    fn test_drop_short_artifact() {
        let mut page = page_of(&["Good line", "  K?? garbled  ", "EOtext", "□square□"]);
        let report = clean_page(&mut page, &CleanupOptions::default());

        assert_eq!(report.dropped, 3);
        assert_eq!(texts(&page), vec!["Good line"]);
        assert_eq!(report.drop_reasons.get(&ArtifactKind::QuestionableGlyph), Some(&1));
        assert_eq!(report.drop_reasons.get(&ArtifactKind::EndOfText), Some(&1));
        assert_eq!(report.drop_reasons.get(&ArtifactKind::BoxPlaceholder), Some(&1));
    }

    #[test]
    fn test_fix_never_leaves_joined_signature() {
        let mut page = page_of(&["Note K□?? here", "Rate K?□? rose", "Plain line"]);
        let report = clean_page(&mut page, &CleanupOptions::default());

        assert_eq!(report.dropped, 0);
        assert_eq!(report.rewritten, 2);
        assert_eq!(texts(&page), vec!["Note  here", "Rate  rose", "Plain line"]);
        for fragment in &page.fragments {
            assert_eq!(matches_artifact(&fragment.text), None);
        }
    }

    #[test]
    fn test_long_artifact_kept_and_fixed() {
        let long = format!("{} EOtext", "word ".repeat(40));
        let mut page = page_of(&[&long]);
        let report = clean_page(&mut page, &CleanupOptions::default());

        assert_eq!(report.dropped, 0);
        assert_eq!(report.rewritten, 1);
        assert!(!page.fragments[0].text.contains("EOtext"));
    }

    #[test]
    fn test_rewrite_uses_trimmed_text() {
        let mut page = page_of(&["  Q1Q1Q1 answers  "]);
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.rewritten, 1);
        assert_eq!(texts(&page), vec!["Q1 answers"]);
    }

    #[test]
    fn test_unchanged_text_keeps_whitespace() {
        let mut page = page_of(&["  plain text  "]);
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.rewritten, 0);
        assert_eq!(texts(&page), vec!["  plain text  "]);
    }

    #[test]
    fn test_dedupe_sees_fixed_text() {
        // Both copies normalize to the same key only after the fixer ran
        let mut page = page_of(&["Summary of findingsEOtext and more", "Summary of findings and more"]);
        let report = clean_page(&mut page, &CleanupOptions::default().without_drop());
        assert_eq!(report.rewritten, 1);
        assert_eq!(report.deduplicated, 1);
    }

    #[test]
    fn test_empty_fragments_kept() {
        let mut page = page_of(&["", "   ", ""]);
        let report = clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(report.kept, 3);
        assert_eq!(report.dropped + report.deduplicated, 0);
    }

    #[test]
    fn test_math_wrapping_in_pass() {
        let mut page = page_of(&["Δ d(t) decreases", "@_on"]);
        clean_page(&mut page, &CleanupOptions::default());
        assert_eq!(
            texts(&page),
            vec![r"\(\Delta d(t)\) decreases", r"\(@_{\mathrm{on}}\)"]
        );

        let mut page = page_of(&["Δ d(t) decreases"]);
        clean_page(&mut page, &CleanupOptions::without_math());
        assert_eq!(texts(&page), vec!["Δ d(t) decreases"]);
    }

    #[test]
    fn test_stages_disabled() {
        let options = CleanupOptions {
            drop_artifacts: false,
            fix_inline: false,
            deduplicate: false,
            ..CleanupOptions::default()
        };
        let mut page = page_of(&["K?? x", "EOtext line", "EOtext line"]);
        let report = clean_page(&mut page, &options);
        assert_eq!(report.kept, 3);
        assert_eq!(report.rewritten, 0);
        assert_eq!(texts(&page), vec!["K?? x", "EOtext line", "EOtext line"]);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut doc = Document::from_pages(vec![page_of(&[
            "Intro Q2Q2 text",
            "K?? noise",
            "A repeated sentence here",
            "A repeated sentence here",
            "G(t) >= G_min holds",
        ])]);
        let first = clean_document(&mut doc, &CleanupOptions::default());
        assert!(first.has_changes());

        let snapshot = doc.clone();
        let second = clean_document(&mut doc, &CleanupOptions::default());
        assert!(!second.has_changes());
        assert_eq!(doc, snapshot);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pages: Vec<Page> = (1..=20)
            .map(|n| {
                let mut page = Page::numbered(n);
                page.push_paragraph("Shared running header");
                page.push_paragraph("EOtext");
                page.push_list_item(format!("Item on page {n} Q1Q1"));
                page.push_paragraph("Shared running header");
                page
            })
            .collect();

        let mut sequential = Document::from_pages(pages.clone());
        let mut parallel = Document::from_pages(pages);
        let seq_report = clean_document(&mut sequential, &CleanupOptions::default());
        let par_report = clean_document(&mut parallel, &CleanupOptions::default().parallel());

        assert_eq!(sequential, parallel);
        assert_eq!(seq_report, par_report);
        assert_eq!(seq_report.deduplicated, 20);
        assert_eq!(seq_report.dropped, 20);
        assert_eq!(
            parallel.pages[0].fragments[1],
            Fragment::new(FragmentKind::ListItem, "Item on page 1 Q1")
        );
    }

    #[test]
    fn test_report_totals() {
        let mut doc = Document::from_pages(vec![
            page_of(&["K??", "keep me please"]),
            page_of(&["EOtext", "and me as well"]),
        ]);
        let report = clean_document(&mut doc, &CleanupOptions::default());
        assert_eq!(report.pages, 2);
        assert_eq!(report.seen, 4);
        assert_eq!(report.dropped, 2);
        assert_eq!(report.kept, 2);
        assert_eq!(report.page_reports.len(), 2);
        assert_eq!(report.page_reports[1].page, Some(1));
    }

    #[test]
    fn test_options_presets() {
        let default = CleanupOptions::default();
        assert!(default.drop_artifacts && default.fix_inline && default.wrap_math);
        assert!(default.deduplicate);
        assert_eq!(default.drop_max_chars, 160);
        assert_eq!(default.dedupe_min_chars, 12);

        let minimal = CleanupOptions::minimal();
        assert!(minimal.drop_artifacts);
        assert!(!minimal.wrap_math);
        assert!(!minimal.deduplicate);
    }

    #[test]
    fn test_options_from_json() {
        let options = CleanupOptions::from_json(r#"{"deduplicate": false}"#).unwrap();
        assert!(!options.deduplicate);
        assert_eq!(options.drop_max_chars, DROP_MAX_CHARS);

        let invalid = CleanupOptions::from_json(r#"{"drop_max_chars": 0}"#);
        assert!(matches!(invalid, Err(Error::InvalidOption(_))));

        assert!(matches!(CleanupOptions::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_options_from_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"wrap_math": false, "parallel": true}}"#).unwrap();
        let options = CleanupOptions::from_json_file(file.path()).unwrap();
        assert!(!options.wrap_math);
        assert!(options.parallel);
    }
}
