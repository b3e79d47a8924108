//! Small string helpers shared by the extractor, the console output and logging.

use itertools::Itertools;

/// Join text fragments into one trimmed line.
///
/// Fragments are concatenated as they appear, so text split across inline
/// tags stays glued together. Leading and trailing whitespace disappears and
/// every internal run of whitespace (including newlines from the markup)
/// collapses to one space. An input that is only whitespace yields an empty
/// string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_text(["  Apple", "'s\n", " profit "]), "Apple's profit");
/// ```
pub fn normalize_text<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    fragments
        .into_iter()
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}

/// First `max` characters of a headline, for the sentiment lines.
///
/// Counts characters rather than bytes so multi-byte text never splits.
pub fn headline_preview(headline: &str, max: usize) -> &str {
    match headline.char_indices().nth(max) {
        Some((idx, _)) => &headline[..idx],
        None => headline,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let head = headline_preview(s, max);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}
