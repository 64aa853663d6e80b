//! Truncation helpers for human-readable entity labels.

/// Characters kept when labelling a catalog entry (category, genre, title).
pub const LABEL_MAX_CHARS: usize = 79;

/// Characters kept when previewing free text (review or comment bodies).
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Return the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
/// Borrows the input when no truncation is needed.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Label form of a catalog name.
pub fn label(name: &str) -> &str {
    truncate_chars(name, LABEL_MAX_CHARS)
}

/// Preview form of a text body.
pub fn preview(text: &str) -> &str {
    truncate_chars(text, PREVIEW_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_chars("Drama", 79), "Drama");
    }

    #[test]
    fn exact_length_is_unchanged() {
        let text = "x".repeat(79);
        assert_eq!(label(&text), text);
    }

    #[test]
    fn long_text_is_cut() {
        let text = "y".repeat(150);
        assert_eq!(label(&text).len(), 79);
        assert_eq!(preview(&text).len(), 100);
    }

    #[test]
    fn multibyte_boundary_is_respected() {
        let text = "ё".repeat(120);
        let cut = preview(&text);
        assert_eq!(cut.chars().count(), 100);
        assert_eq!(cut.len(), 200);
    }

    #[test]
    fn zero_keeps_nothing() {
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
