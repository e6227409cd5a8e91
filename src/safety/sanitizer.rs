//! Best-effort markup and script stripping for accepted field values.
//!
//! Applies a fixed, ordered denylist of regex removals: script blocks, `src`
//! attribute values, lone script tags, `eval(...)`/`expression(...)` calls,
//! `javascript:`/`vbscript:` schemes and `onload...=` handler prefixes.
//!
//! This is a denylist, not an HTML parser. It does not canonicalize encoded
//! input (entities, percent-encoding, unicode escapes) and is **not** a
//! guarantee of XSS safety. Output that ends up in HTML must still be
//! escaped by the renderer.
//!
//! Pattern order matters: later removals run on text already collapsed by
//! earlier ones, so the list must not be merged into a single expression.

use once_cell::sync::Lazy;
use regex::Regex;

/// Result of running the denylist over an input string.
#[derive(Debug, Clone)]
pub struct SanitizedOutput {
    /// The content after all removals.
    pub content: String,
    /// Labels of the patterns that removed something, in application order.
    pub removed: Vec<&'static str>,
    /// Whether the content was modified.
    pub was_modified: bool,
}

// ---------------------------------------------------------------------------
// Pattern definitions
// ---------------------------------------------------------------------------

/// `(label, pattern)` pairs, applied top to bottom.
///
/// `(?i)` everywhere; `(?s)` where the match may span newlines.
const STRIP_PATTERNS: &[(&str, &str)] = &[
    // Anything between script tags
    ("script_block", r"(?i)<script>(.*?)</script>"),
    // src='...' and src="..." attribute values
    ("src_single_quoted", r#"(?is)src[\r\n]*=[\r\n]*'(.*?)'"#),
    ("src_double_quoted", r#"(?is)src[\r\n]*=[\r\n]*"(.*?)""#),
    // Lone closing tag
    ("script_close", r"(?i)</script>"),
    // Lone opening tag, possibly with attributes
    ("script_open", r"(?is)<script(.*?)>"),
    // eval(...) and expression(...) calls
    ("eval_call", r"(?is)eval\((.*?)\)"),
    ("expression_call", r"(?is)expression\((.*?)\)"),
    // Scheme prefixes
    ("javascript_scheme", r"(?i)javascript:"),
    ("vbscript_scheme", r"(?i)vbscript:"),
    // onload...= handler prefixes
    ("onload_handler", r"(?is)onload(.*?)="),
];

/// Compiled denylist, in the same order as [`STRIP_PATTERNS`].
static COMPILED_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    STRIP_PATTERNS
        .iter()
        .map(|&(label, pat)| {
            let re = Regex::new(pat).expect("strip patterns are fixed literals");
            (re, label)
        })
        .collect()
});

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the denylist over `input` and report which patterns fired.
///
/// Embedded NUL characters are dropped before any pattern runs.
pub fn sanitize(input: &str) -> SanitizedOutput {
    let mut content = input.replace('\0', "");
    let mut removed = Vec::new();
    let mut was_modified = content.len() != input.len();

    for (regex, label) in COMPILED_PATTERNS.iter() {
        if regex.is_match(&content) {
            content = regex.replace_all(&content, "").into_owned();
            removed.push(*label);
            was_modified = true;
        }
    }

    SanitizedOutput {
        content,
        removed,
        was_modified,
    }
}

/// Strip denylisted markup from `input`, returning only the cleaned text.
///
/// # Examples
/// ```
/// use rulewash::safety::sanitizer::strip_xss;
///
/// assert_eq!(strip_xss("hi<script>alert(1)</script>!"), "hi!");
/// assert_eq!(strip_xss("plain text"), "plain text");
/// ```
pub fn strip_xss(input: &str) -> String {
    sanitize(input).content
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
