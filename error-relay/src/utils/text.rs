//! Character-bounded truncation helpers.
//!
//! All limits count Unicode scalar values, never bytes, so a cut can not
//! land inside a multi-byte character.

const ELLIPSIS: &str = "...";

/// Byte offset just past the first `max_chars` characters of `s`.
fn char_boundary(s: &str, max_chars: usize) -> Option<usize> {
    s.char_indices().nth(max_chars).map(|(idx, _)| idx)
}

/// Cut `s` to at most `max_chars` characters with no marker.
pub fn truncate_hard(s: &str, max_chars: usize) -> &str {
    match char_boundary(s, max_chars) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Cut `s` to at most `max_chars` characters, replacing the tail with `...`
/// when a cut happens. The result never exceeds `max_chars`.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if char_boundary(s, max_chars).is_none() {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    format!("{}{}", truncate_hard(s, keep), ELLIPSIS)
}

/// Keep the first `max_chars` characters and append `...` when a cut
/// happens. The result may exceed `max_chars` by the marker length.
pub fn truncate_then_mark(s: &str, max_chars: usize) -> String {
    if char_boundary(s, max_chars).is_none() {
        return s.to_string();
    }
    format!("{}{}", truncate_hard(s, max_chars), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_hard_short_input_untouched() {
        assert_eq!(truncate_hard("abc", 5), "abc");
        assert_eq!(truncate_hard("abcde", 5), "abcde");
    }

    #[test]
    fn test_truncate_hard_cuts_exactly() {
        let input = "x".repeat(3000);
        assert_eq!(truncate_hard(&input, 2048).chars().count(), 2048);
    }

    #[test]
    fn test_truncate_hard_counts_characters_not_bytes() {
        let input = "é".repeat(10);
        let cut = truncate_hard(&input, 4);
        assert_eq!(cut, "éééé");
        assert_eq!(cut.len(), 8);
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");

        let long = "a".repeat(300);
        let out = truncate_with_ellipsis(&long, 256);
        assert_eq!(out.chars().count(), 256);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_with_ellipsis_at_exact_limit() {
        let exact = "b".repeat(256);
        assert_eq!(truncate_with_ellipsis(&exact, 256), exact);
    }

    #[test]
    fn test_truncate_then_mark() {
        let trace = "t".repeat(901);
        let out = truncate_then_mark(&trace, 900);
        assert_eq!(out.len(), 903);
        assert_eq!(&out[..900], &trace[..900]);
        assert!(out.ends_with("..."));

        assert_eq!(truncate_then_mark("short", 900), "short");
    }
}
