//! In-place rewriting of fragment text.
//!
//! The fixer is an ordered list of pure [`InlineStep`]s. Noise removal can
//! expose new matches (deleting `□` from `EO□text` yields `EOtext`), so the
//! cleanup steps are repeated until the text stops changing, then math is
//! wrapped, then cleanup is re-run once more over the wrapped text. This
//! keeps `fix_inline` idempotent.
//!
//! Deleting text can also join the drop filter's `K??` signature across the
//! cut (`K□??`, `KEOtext??`). Such joined signatures are deleted as well, so
//! the fixer never leaves a signature that was not already in its input.
//!
//! Word boundaries are ASCII-only: `é` or `Δ` next to a label does not
//! prevent a match.

use super::drop::ArtifactKind;
use crate::math;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static RE_END_OF_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"EOtext").unwrap());

static RE_BOX_GLYPHS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"□square□|□").unwrap());

// Rust regex has no backreferences; runs of any `Q<digit>` labels are matched
// here and only collapsed when every label in the run is identical.
static RE_REPEATED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)(?:Q[0-9]){2,}(?-u:\b)").unwrap());

static RE_ENFORCEMENT_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:(?-u:\b)3\.\s*enforcement\s*\(\?K\?\?B\)\s*,\s*)+").unwrap()
});

/// A single rewrite step of the inline fixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStep {
    /// Remove `EOtext` markers
    StripEndOfText,
    /// Remove `□square□` placeholders and stray `□` glyphs
    StripBoxGlyphs,
    /// Collapse `Q1Q1Q1` into `Q1`
    CollapseRepeatedLabels,
    /// Remove `3. enforcement (?K??B), ` boilerplate runs
    StripEnforcementPlaceholders,
    /// Rewrite `@_on` into `@_{\mathrm{on}}`
    NormalizeSubscripts,
    /// Wrap known math shapes in `\(`…`\)`
    WrapMath,
}

impl InlineStep {
    /// Cleanup steps, in application order.
    pub const CLEANUP: [InlineStep; 5] = [
        InlineStep::StripEndOfText,
        InlineStep::StripBoxGlyphs,
        InlineStep::CollapseRepeatedLabels,
        InlineStep::StripEnforcementPlaceholders,
        InlineStep::NormalizeSubscripts,
    ];

    /// Applies this step to `text`.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            InlineStep::StripEndOfText => remove_matches(&RE_END_OF_TEXT, text),
            InlineStep::StripBoxGlyphs => remove_matches(&RE_BOX_GLYPHS, text),
            InlineStep::CollapseRepeatedLabels => collapse_repeated_labels(text),
            InlineStep::StripEnforcementPlaceholders => {
                remove_matches(&RE_ENFORCEMENT_PLACEHOLDER, text)
            }
            InlineStep::NormalizeSubscripts => math::normalize_subscripts(text),
            InlineStep::WrapMath => math::wrap_math_fragments(text),
        }
    }
}

/// Deletes every match of `re`, then any `K??` spanning one of the cuts.
fn remove_matches<'a>(re: &Regex, text: &'a str) -> Cow<'a, str> {
    if !re.is_match(text) {
        return Cow::Borrowed(text);
    }

    let spans: Vec<(usize, usize)> = re.find_iter(text).map(|m| (m.start(), m.end())).collect();
    let (mut output, mut cuts) = cut_spans(text, &spans);
    while let Some(joined) = joined_signatures(&output, &cuts) {
        (output, cuts) = cut_spans(&output, &joined);
    }
    Cow::Owned(output)
}

/// Removes the sorted, disjoint byte `spans`, returning the text and the
/// offsets in it where each removal happened.
fn cut_spans(text: &str, spans: &[(usize, usize)]) -> (String, Vec<usize>) {
    let mut output = String::with_capacity(text.len());
    let mut cuts = Vec::with_capacity(spans.len());
    let mut last = 0;
    for &(start, end) in spans {
        output.push_str(&text[last..start]);
        cuts.push(output.len());
        last = end;
    }
    output.push_str(&text[last..]);
    (output, cuts)
}

/// Spans of `K??` occurrences that straddle a cut, or `None` if there are none.
fn joined_signatures(text: &str, cuts: &[usize]) -> Option<Vec<(usize, usize)>> {
    let signature = ArtifactKind::QuestionableGlyph.signature();
    let joined: Vec<(usize, usize)> = text
        .match_indices(signature)
        .map(|(start, _)| (start, start + signature.len()))
        .filter(|&(start, end)| cuts.iter().any(|&cut| start < cut && cut < end))
        .collect();
    (!joined.is_empty()).then_some(joined)
}

fn collapse_repeated_labels(text: &str) -> Cow<'_, str> {
    RE_REPEATED_LABEL.replace_all(text, |caps: &Captures| {
        let run = &caps[0];
        let label = &run[..2];
        if run.as_bytes().chunks(2).all(|pair| pair == label.as_bytes()) {
            label.to_string()
        } else {
            run.to_string()
        }
    })
}

/// Applies the cleanup steps repeatedly until the text is stable.
///
/// Every cleanup step either deletes text or leaves it alone, apart from the
/// subscript rewrite which cannot re-trigger itself, so this terminates.
fn stabilize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for step in InlineStep::CLEANUP {
            if let Cow::Owned(changed) = step.apply(&next) {
                next = changed;
            }
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Rewrites fragment text, optionally wrapping math shapes.
///
/// Idempotent: `fix_text(&fix_text(x, m), m) == fix_text(x, m)`.
pub fn fix_text(text: &str, wrap_math: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = stabilize(text);
    if !wrap_math {
        return cleaned;
    }

    match InlineStep::WrapMath.apply(&cleaned) {
        Cow::Borrowed(_) => cleaned,
        Cow::Owned(wrapped) => stabilize(&wrapped),
    }
}

/// Rewrites fragment text with every step enabled.
pub fn fix_inline(text: &str) -> String {
    fix_text(text, true)
}
