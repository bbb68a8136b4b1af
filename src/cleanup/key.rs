//! Canonical comparison keys for duplicate detection.
//!
//! The key is never displayed; it only decides whether two fragments are the
//! same line repeated by the extractor.

use crate::model::{Fragment, FragmentKind};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-]+\s+").unwrap());

static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\s*[.)]\s+").unwrap());

/// Length of `text` in UTF-16 code units.
///
/// Both cleanup thresholds are measured in this unit, so a character outside
/// the Basic Multilingual Plane (`𝐱`, most emoji) counts twice.
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Normalizes text into its comparison form.
///
/// 1. Collapse whitespace runs to one space
/// 2. Trim
/// 3. Lowercase
/// 4. Fold single quotes and apostrophe-like marks to `'`
/// 5. Fold curly double quotes to `"`
/// 6. Strip one leading bullet marker
/// 7. Strip one leading `1.` / `1)` list marker
pub fn normalize_key(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = RE_WHITESPACE.replace_all(text, " ");
    let lowered = collapsed.trim().to_lowercase();

    let folded: String = lowered
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect();

    let without_bullet = RE_LEADING_BULLET.replace(&folded, "");
    RE_LEADING_NUMBER.replace(&without_bullet, "").into_owned()
}

/// Kind plus normalized text of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    /// Fragment kind
    pub kind: FragmentKind,
    /// Normalized text
    pub text: String,
}

impl CanonicalKey {
    /// Builds the key for a kind and raw text.
    pub fn new(kind: FragmentKind, raw: &str) -> Self {
        Self {
            kind,
            text: normalize_key(raw),
        }
    }

    /// Builds the key for a fragment's current text.
    pub fn of(fragment: &Fragment) -> Self {
        Self::new(fragment.kind, &fragment.text)
    }

    /// Length of the normalized text in UTF-16 code units.
    pub fn text_len(&self) -> usize {
        text_length(&self.text)
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.text)
    }
}
