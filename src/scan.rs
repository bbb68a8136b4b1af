//! Read-only artifact diagnosis.
//!
//! Where [`crate::cleanup`] fixes a known set of artifacts, the scanner
//! reports suspicious shapes without touching the text, so new artifact
//! families can be spotted in a converted document before a fix exists.

use crate::cleanup::ArtifactKind;
use crate::model::Document;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Default minimum length for a repeated line to be reported.
pub const DEFAULT_MIN_LINE_LEN: usize = 8;

/// How many following lines are compared against each line.
pub const LOOKAHEAD_LINES: usize = 9;

/// Characters of context kept on each side of a match.
pub const CONTEXT_CHARS: usize = 40;

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Minimum trimmed length of a repeated line
    pub min_line_len: usize,
    /// Report repeated lines
    pub repeated_lines: bool,
    /// Report suspicious patterns
    pub patterns: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            min_line_len: DEFAULT_MIN_LINE_LEN,
            repeated_lines: true,
            patterns: true,
        }
    }
}

impl ScanOptions {
    /// Sets the minimum repeated-line length.
    pub fn with_min_line_len(mut self, len: usize) -> Self {
        self.min_line_len = len;
        self
    }
}

/// A line that reappears shortly after itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedLine {
    /// 1-based line number of the first occurrence
    pub line: usize,
    /// Trimmed line text
    pub text: String,
    /// Span in lines from the first occurrence to the repeat, inclusive
    pub repetitions: usize,
    /// 1-based line numbers covered by the span
    pub positions: Vec<usize>,
}

/// One hit of a suspicious pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspiciousMatch {
    /// Pattern name
    pub pattern: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Matched text
    pub occurrence: String,
    /// Surrounding text with newlines flattened
    pub context: String,
    /// Byte offset of the match
    pub position: usize,
}

/// Result of scanning a text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Length of the text in characters
    pub text_length: usize,
    /// Number of lines
    pub line_count: usize,
    /// Lines repeated within the lookahead
    pub repeated_lines: Vec<RepeatedLine>,
    /// Suspicious pattern hits, grouped by pattern
    pub suspicious: Vec<SuspiciousMatch>,
}

impl ScanReport {
    /// Returns true if nothing suspicious was found.
    pub fn is_clean(&self) -> bool {
        self.repeated_lines.is_empty() && self.suspicious.is_empty()
    }
}

/// Per-page scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageScan {
    /// Page number, if known
    pub page: Option<u32>,
    /// Scan of the page text
    pub report: ScanReport,
}

struct PatternRule {
    name: &'static str,
    description: &'static str,
    regex: Regex,
}

static PATTERN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    let rule = |name, description, pattern: &str| PatternRule {
        name,
        description,
        regex: Regex::new(pattern).unwrap(),
    };
    vec![
        rule(
            "glued_conjunction",
            "words glued around and/or",
            r"\w+(?:et/ou|ou/et|and/or)\w+",
        ),
        rule(
            "unbalanced_parenthesis",
            "parenthesis probably not closed",
            r"\(.*?[^)]{2,}\)",
        ),
        rule(
            "special_characters",
            "suspicious run of special characters",
            r"[@$%&*]{2,}",
        ),
        rule("glued_quad", "typical glued 'quad' artifact", r"\w+quad\w+"),
        rule(
            "doubled_pagination",
            "doubled page footer",
            r"Page \d+ / \d+\s*Page \d+ / \d+",
        ),
        rule(
            "doubled_formula",
            "consecutive duplicated inline LaTeX",
            r"\\\(.*?\\\)\s*\\\(.*?\\\)",
        ),
    ]
});

/// Finds lines repeated within the next [`LOOKAHEAD_LINES`] lines.
///
/// After a repeat is recorded, scanning resumes at the repeated line.
pub fn find_repeated_lines(text: &str, min_len: usize) -> Vec<RepeatedLine> {
    let lines: Vec<&str> = text.lines().collect();
    let mut found = Vec::new();

    let mut i = 0;
    while i + 1 < lines.len() {
        let current = lines[i].trim();
        if current.is_empty() {
            i += 1;
            continue;
        }

        let end = (i + 1 + LOOKAHEAD_LINES).min(lines.len());
        let repeat = (i + 1..end)
            .find(|&j| lines[j].trim() == current && current.chars().count() >= min_len);

        match repeat {
            Some(j) => {
                found.push(RepeatedLine {
                    line: i + 1,
                    text: current.to_string(),
                    repetitions: j - i + 1,
                    positions: (i + 1..=j + 1).collect(),
                });
                i = j;
            }
            None => i += 1,
        }
    }

    found
}

/// Finds suspicious patterns and known artifact signatures.
pub fn find_suspicious_patterns(text: &str) -> Vec<SuspiciousMatch> {
    let mut found = Vec::new();

    for (start, end) in repeated_sequences(text) {
        found.push(suspicious(
            text,
            "repeated_sequence",
            "repeated word or sequence",
            start,
            end,
        ));
    }

    for rule in PATTERN_RULES.iter() {
        for m in rule.regex.find_iter(text) {
            found.push(suspicious(
                text,
                rule.name,
                rule.description,
                m.start(),
                m.end(),
            ));
        }
    }

    for kind in ArtifactKind::ALL {
        let signature = kind.signature();
        for (start, _) in text.match_indices(signature) {
            found.push(suspicious(
                text,
                "artifact_signature",
                artifact_description(kind),
                start,
                start + signature.len(),
            ));
        }
    }

    found
}

fn artifact_description(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::QuestionableGlyph => "undecoded glyph (K??)",
        ArtifactKind::EndOfText => "leaked end-of-text marker",
        ArtifactKind::BoxPlaceholder => "unresolved box glyph placeholder",
    }
}

fn suspicious(
    text: &str,
    pattern: &'static str,
    description: &'static str,
    start: usize,
    end: usize,
) -> SuspiciousMatch {
    SuspiciousMatch {
        pattern,
        description,
        occurrence: text[start..end].to_string(),
        context: context_around(text, start, end),
        position: start,
    }
}

/// Returns up to [`CONTEXT_CHARS`] characters on each side of a byte range.
fn context_around(text: &str, start: usize, end: usize) -> String {
    let before = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(idx, _)| idx);
    let after = text[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(text.len(), |(idx, _)| end + idx);

    text[before..after].replace('\n', " ").trim().to_string()
}

/// Byte ranges where a non-space sequence of three or more characters is
/// immediately repeated at least twice more (`abcabcabc`).
///
/// At each start the longest repeating unit wins, mirroring a greedy
/// `(\S{3,})\1{2,}` match.
fn repeated_sequences(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    let mut run_start = 0;
    while run_start < chars.len() {
        if chars[run_start].1.is_whitespace() {
            run_start += 1;
            continue;
        }
        let mut run_end = run_start;
        while run_end < chars.len() && !chars[run_end].1.is_whitespace() {
            run_end += 1;
        }

        let run: Vec<char> = chars[run_start..run_end].iter().map(|&(_, c)| c).collect();
        let mut i = 0;
        while i < run.len() {
            match longest_repeat_at(&run, i) {
                Some(len) => {
                    let start = chars[run_start + i].0;
                    let end = chars
                        .get(run_start + i + len)
                        .map_or(text.len(), |&(idx, _)| idx);
                    ranges.push((start, end));
                    i += len;
                }
                None => i += 1,
            }
        }

        run_start = run_end;
    }

    ranges
}

/// Length in chars of the longest `unit{3,}` match starting at `start`.
fn longest_repeat_at(run: &[char], start: usize) -> Option<usize> {
    let remaining = run.len() - start;
    (3..=remaining / 3).rev().find_map(|unit| {
        let pattern = &run[start..start + unit];
        let copies = run[start..]
            .chunks_exact(unit)
            .take_while(|chunk| *chunk == pattern)
            .count();
        (copies >= 3).then_some(unit * copies)
    })
}

/// Scans a text for repeated lines and suspicious patterns.
pub fn scan(text: &str, options: &ScanOptions) -> ScanReport {
    ScanReport {
        text_length: text.chars().count(),
        line_count: text.lines().count().max(1),
        repeated_lines: if options.repeated_lines {
            find_repeated_lines(text, options.min_line_len)
        } else {
            Vec::new()
        },
        suspicious: if options.patterns {
            find_suspicious_patterns(text)
        } else {
            Vec::new()
        },
    }
}

/// Scans every page of a document separately.
pub fn scan_document(document: &Document, options: &ScanOptions) -> Vec<PageScan> {
    document
        .pages
        .iter()
        .map(|page| PageScan {
            page: page.number,
            report: scan(&page.plain_text(), options),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    #[test]
    fn test_repeated_lines_consecutive() {
        let text = "Intro line\nRepeated line here\nRepeated line here\nOutro";
        let found = find_repeated_lines(text, DEFAULT_MIN_LINE_LEN);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].text, "Repeated line here");
        assert_eq!(found[0].repetitions, 2);
        assert_eq!(found[0].positions, vec![2, 3]);
    }

    #[test]
    fn test_repeated_lines_with_gap() {
        let text = "Running footer\na\nb\nc\n  Running footer  ";
        let found = find_repeated_lines(text, DEFAULT_MIN_LINE_LEN);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].repetitions, 5);
        assert_eq!(found[0].positions, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_repeated_lines_outside_lookahead() {
        let mut lines = vec!["Running footer".to_string()];
        lines.extend((0..LOOKAHEAD_LINES).map(|i| format!("filler {i}")));
        lines.push("Running footer".to_string());
        let found = find_repeated_lines(&lines.join("\n"), DEFAULT_MIN_LINE_LEN);
        assert!(found.is_empty());
    }

    #[test]
    fn test_repeated_lines_min_length() {
        let text = "short\nshort\nshort";
        assert!(find_repeated_lines(text, DEFAULT_MIN_LINE_LEN).is_empty());
        assert_eq!(find_repeated_lines(text, 3).len(), 2);
    }

    #[test]
    fn test_repeated_sequence() {
        let found = find_suspicious_patterns("see abcabcabc here");
        let hit = found
            .iter()
            .find(|m| m.pattern == "repeated_sequence")
            .unwrap();
        assert_eq!(hit.occurrence, "abcabcabc");
        assert_eq!(hit.position, 4);
    }

    #[test]
    fn test_repeated_sequence_needs_three_copies() {
        let found = find_suspicious_patterns("abcabc");
        assert!(found.iter().all(|m| m.pattern != "repeated_sequence"));
    }

    #[test]
    fn test_repeated_sequence_prefers_longest_unit() {
        let ranges = repeated_sequences("xyzxyzxyzxyzxyzxyz");
        assert_eq!(ranges, vec![(0, 18)]);
    }

    #[test]
    fn test_repeated_sequence_multibyte() {
        let text = "é ΔΔΔΔΔΔΔΔΔ";
        let ranges = repeated_sequences(text);
        assert_eq!(ranges.len(), 1);
        assert_eq!(&text[ranges[0].0..ranges[0].1], "ΔΔΔΔΔΔΔΔΔ");
    }

    #[test]
    fn test_pattern_rules() {
        let text = "textet/ouquad and a%%b sizequadword then Page 3 / 74 Page 3 / 74 end";
        let found = find_suspicious_patterns(text);
        let names: Vec<&str> = found.iter().map(|m| m.pattern).collect();
        assert!(names.contains(&"glued_conjunction"));
        assert!(names.contains(&"glued_quad"));
        assert!(names.contains(&"special_characters"));
        assert!(names.contains(&"doubled_pagination"));
    }

    #[test]
    fn test_doubled_formula() {
        let found = find_suspicious_patterns(r"x \(a\) \(a\) y");
        assert!(found.iter().any(|m| m.pattern == "doubled_formula"));
    }

    #[test]
    fn test_artifact_signatures_reported() {
        let found = find_suspicious_patterns("ok K?? and EOtext and □square□");
        let signatures: Vec<&str> = found
            .iter()
            .filter(|m| m.pattern == "artifact_signature")
            .map(|m| m.occurrence.as_str())
            .collect();
        assert_eq!(signatures, vec!["K??", "EOtext", "□square□"]);
    }

    #[test]
    fn test_context_window() {
        let text = format!("{}EOtext{}", "a".repeat(100), "b\n".repeat(50));
        let found = find_suspicious_patterns(&text);
        let hit = found.iter().find(|m| m.occurrence == "EOtext").unwrap();
        assert!(hit.context.starts_with(&"a".repeat(40)));
        assert!(!hit.context.contains('\n'));
        assert!(hit.context.chars().count() <= 40 + 6 + 40);
    }

    #[test]
    fn test_scan_clean_text() {
        let report = scan("Nothing odd here.\nJust prose.", &ScanOptions::default());
        assert!(report.is_clean());
        assert_eq!(report.line_count, 2);
        assert_eq!(report.text_length, 29);
    }

    #[test]
    fn test_scan_options_toggle() {
        let options = ScanOptions {
            patterns: false,
            ..ScanOptions::default()
        };
        let report = scan("EOtext\nEOtext", &options.with_min_line_len(3));
        assert!(report.suspicious.is_empty());
        assert_eq!(report.repeated_lines.len(), 1);
    }

    #[test]
    fn test_scan_document_per_page() {
        let doc = Document::from_pages(vec![
            Page::numbered(1).with_paragraph("clean"),
            Page::numbered(2).with_paragraph("K?? broken"),
        ]);
        let scans = scan_document(&doc, &ScanOptions::default());
        assert_eq!(scans.len(), 2);
        assert!(scans[0].report.is_clean());
        assert_eq!(scans[1].page, Some(2));
        assert!(!scans[1].report.is_clean());
    }
}
