//! Shallow display-math wrapping for extracted text.
//!
//! Extraction flattens formulas into plain text such as `Δ d(t)` or
//! `G(t) >= G_min`. This module recognizes a fixed set of such shapes and
//! wraps them in MathJax inline delimiters. It does not parse math: anything
//! outside the known shapes is left untouched.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Opening inline-math delimiter.
pub const INLINE_OPEN: &str = r"\(";
/// Closing inline-math delimiter.
pub const INLINE_CLOSE: &str = r"\)";
/// Opening block-math delimiter.
pub const BLOCK_OPEN: &str = r"\[";

/// Single-letter functions of `t` that get wrapped.
pub const FUNCTION_LETTERS: &str = "POERGL";

/// Display form of the `on` subscript.
pub const ON_SUBSCRIPT: &str = r"@_{\mathrm{on}}";

static RE_ON_SUBSCRIPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@_on").unwrap());

// Alternatives are tried leftmost-first at each position, so the inequality
// shape must precede the bare `G(t)` function shape.
static RE_MATH_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<delta>Δ\s*d\(t\))
        | (?P<ineq>G\(t\)\s*(?:≥|>=)\s*G_(?P<sub>[A-Za-z]+))
        | (?P<at>@\s*\(t\))
        | (?-u:\b)(?P<func>[POERGL])\(t\)
        | (?P<on>@_\{\\mathrm\{on\}\})
        ",
    )
    .unwrap()
});

/// Returns true if the text already carries a display-math opener anywhere.
pub fn has_math_delimiters(text: &str) -> bool {
    text.contains(INLINE_OPEN) || text.contains(BLOCK_OPEN)
}

/// Rewrites the plain `@_on` subscript into its display form.
pub fn normalize_subscripts(text: &str) -> Cow<'_, str> {
    RE_ON_SUBSCRIPT.replace_all(text, ON_SUBSCRIPT)
}

/// Wraps the known math shapes in `\(`…`\)`.
///
/// Does nothing when [`has_math_delimiters`] is true, so applying it to its
/// own output is a no-op.
pub fn wrap_math_fragments(text: &str) -> Cow<'_, str> {
    if has_math_delimiters(text) {
        return Cow::Borrowed(text);
    }
    RE_MATH_FRAGMENT.replace_all(text, |caps: &Captures| wrap(&render_fragment(caps)))
}

fn render_fragment(caps: &Captures) -> String {
    if caps.name("delta").is_some() {
        r"\Delta d(t)".to_string()
    } else if let Some(sub) = caps.name("sub") {
        format!("G(t) ≥ G_{}", sub.as_str())
    } else if caps.name("at").is_some() {
        "@(t)".to_string()
    } else if let Some(func) = caps.name("func") {
        format!("{}(t)", func.as_str())
    } else {
        ON_SUBSCRIPT.to_string()
    }
}

fn wrap(inner: &str) -> String {
    format!("{}{}{}", INLINE_OPEN, inner, INLINE_CLOSE)
}
