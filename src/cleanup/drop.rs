//! Detection of fragments that are pure extraction garbage.

use super::key::text_length;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fragments at least this long are kept even when they carry an artifact
/// signature.
pub const DROP_MAX_CHARS: usize = 160;

/// Known artifact signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `K??` left by a glyph that failed to decode
    QuestionableGlyph,
    /// `EOtext` end-of-text marker leaking into content
    EndOfText,
    /// `□square□` placeholder for an unresolved box glyph
    BoxPlaceholder,
}

impl ArtifactKind {
    /// All signatures, in detection order.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::QuestionableGlyph,
        ArtifactKind::EndOfText,
        ArtifactKind::BoxPlaceholder,
    ];

    /// Literal text of the signature.
    pub fn signature(self) -> &'static str {
        match self {
            ArtifactKind::QuestionableGlyph => "K??",
            ArtifactKind::EndOfText => "EOtext",
            ArtifactKind::BoxPlaceholder => "□square□",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::QuestionableGlyph => "questionable glyph",
            ArtifactKind::EndOfText => "end-of-text marker",
            ArtifactKind::BoxPlaceholder => "box placeholder",
        };
        f.write_str(name)
    }
}

/// Returns the first artifact signature contained in `text`.
///
/// Matching is literal and case-sensitive.
pub fn matches_artifact(text: &str) -> Option<ArtifactKind> {
    if text.is_empty() {
        return None;
    }
    ArtifactKind::ALL
        .into_iter()
        .find(|kind| text.contains(kind.signature()))
}

/// Decides whether a trimmed raw fragment should be discarded.
///
/// A signature match only counts when the text is shorter than `max_chars`
/// UTF-16 code units; longer matches are treated as false positives.
pub fn should_drop(text: &str, max_chars: usize) -> Option<ArtifactKind> {
    let kind = matches_artifact(text)?;
    (text_length(text) < max_chars).then_some(kind)
}
