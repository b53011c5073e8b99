//! Paragraph segmentation of extracted plain text.
//!
//! Splits on line breaks, trims each candidate, and drops empties without
//! consuming an index: paragraph indices are dense over kept paragraphs.
//! The running character offset models a one-character separator between
//! consecutive paragraphs, so `char_end + 1 == next char_start` whenever
//! the next kept paragraph immediately follows in source order.

use memchr::memchr_iter;

/// One paragraph of extracted text with its offset range.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Paragraph {
    pub paragraph_index: usize,
    /// Trimmed, non-empty paragraph text.
    pub text: String,
    pub char_start: usize,
    /// Exclusive end; always greater than `char_start`.
    pub char_end: usize,
}

/// Split text into offset-tracked paragraphs.
///
/// Pure function of the input; restartable and finite.
pub fn segment(text: &str) -> Vec<Paragraph> {
    let bytes = text.as_bytes();
    let mut paragraphs = Vec::new();
    let mut char_offset = 0usize;
    let mut line_start = 0usize;

    for line_end in memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        if line_end < line_start {
            continue;
        }
        let trimmed = text[line_start..line_end].trim();
        line_start = line_end + 1;

        if trimmed.is_empty() {
            continue;
        }

        let char_count = trimmed.chars().count();
        paragraphs.push(Paragraph {
            paragraph_index: paragraphs.len(),
            text: trimmed.to_string(),
            char_start: char_offset,
            char_end: char_offset + char_count,
        });
        // One separator character is consumed between paragraphs
        char_offset += char_count + 1;
    }

    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_segmentation() {
        let paragraphs = segment("First paragraph.\nSecond paragraph.");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text, "First paragraph.");
        assert_eq!(paragraphs[0].char_start, 0);
        assert_eq!(paragraphs[0].char_end, 16);
        assert_eq!(paragraphs[1].char_start, 17);
        assert_eq!(paragraphs[1].text, "Second paragraph.");
    }

    #[test]
    fn test_empty_lines_skipped_without_consuming_index() {
        let paragraphs = segment("One\n\n   \nTwo");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].paragraph_index, 0);
        assert_eq!(paragraphs[1].paragraph_index, 1);
        // Adjacent kept paragraphs: one separator between them
        assert_eq!(paragraphs[1].char_start, paragraphs[0].char_end + 1);
    }

    #[test]
    fn test_lines_are_trimmed() {
        let paragraphs = segment("  padded  \n");
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "padded");
        assert_eq!(paragraphs[0].char_end, 6);
    }

    #[test]
    fn test_char_offsets_count_chars_not_bytes() {
        let paragraphs = segment("第一段\n第二段");
        assert_eq!(paragraphs[0].char_end, 3);
        assert_eq!(paragraphs[1].char_start, 4);
        assert_eq!(paragraphs[1].char_end, 7);
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n\n").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "a\nb\n\nc";
        assert_eq!(segment(text), segment(text));
    }
}
