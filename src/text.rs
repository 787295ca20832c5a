//! Deterministic text cleaning shared by identity keys, validation, and merge.
//!
//! Two filters live here. [`normalize`] is the lowercase, key-grade form used
//! wherever identity-key determinism matters. [`clean_field`] is the
//! case-preserving form applied to stored field values. Both map every
//! whitespace character to a single space and drop everything outside a small
//! ASCII allow-list, so their output is stable under re-application.

use unicode_segmentation::UnicodeSegmentation;

/// Punctuation kept by both filters in addition to alphanumerics and space.
const ALLOWED_PUNCTUATION: [char; 4] = ['@', '.', '_', '-'];

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == ' ' || ALLOWED_PUNCTUATION.contains(&ch)
}

fn is_field_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == ' ' || ALLOWED_PUNCTUATION.contains(&ch)
}

/// Collapse every run of whitespace (including `\n` and `\r`) into one space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn filter_chars(text: &str, keep: impl Fn(char) -> bool) -> String {
    let filtered: String = text
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .filter(|ch| keep(*ch))
        .collect();
    collapse_whitespace(&filtered)
}

/// Key-grade normalization: lowercase, strip everything outside
/// `[a-z0-9@._- ]`, collapse whitespace runs, trim.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    filter_chars(&text.to_lowercase(), is_key_char)
}

/// Case-preserving field cleaning applied by the validator.
///
/// Drops characters outside `[A-Za-z0-9@._- ]`, collapses whitespace, then
/// truncates to `max_chars` when a cap applies.
#[must_use]
pub fn clean_field(text: &str, max_chars: Option<usize>) -> String {
    let cleaned = filter_chars(text, is_field_char);
    match max_chars {
        Some(cap) => truncate_at_grapheme_boundary(&cleaned, cap)
            .trim_end()
            .to_string(),
        None => cleaned,
    }
}

/// Whitespace-only cleaning for accumulated source text: collapse, cap, trim.
///
/// Unlike [`clean_field`] no characters are dropped, since stored source text
/// may predate validation.
#[must_use]
pub fn clean_source_text(text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(text);
    truncate_at_grapheme_boundary(&collapsed, max_chars)
        .trim_end()
        .to_string()
}

/// Longest prefix of `text` holding at most `max_chars` characters without
/// splitting a grapheme cluster.
#[must_use]
pub fn truncate_at_grapheme_boundary(text: &str, max_chars: usize) -> &str {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut used = 0usize;
    let mut end = 0usize;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let width = grapheme.chars().count();
        if used + width > max_chars {
            break;
        }
        used += width;
        end = idx + grapheme.len();
    }
    &text[..end]
}
