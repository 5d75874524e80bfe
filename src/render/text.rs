//! Text measurement and manual word wrapping.

use crate::constants::{TEXT_CHAR_WIDTH_RATIO, TEXT_LINE_HEIGHT_RATIO};

/// Estimate the width of a single line of text.
///
/// Monospace approximation; surfaces with real font metrics override
/// [`super::Surface::measure_text`].
pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * TEXT_CHAR_WIDTH_RATIO
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * TEXT_LINE_HEIGHT_RATIO
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words are added greedily while the measured line fits. A single word wider
/// than `max_width` gets a line of its own rather than being split. Explicit
/// newlines always break.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }

    // Trailing empty lines carry no ink
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One unit per character.
    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn test_wraps_at_max_width() {
        let lines = wrap_text("water damage near window frame", 12.0, chars);
        assert_eq!(lines, vec!["water damage", "near window", "frame"]);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let lines = wrap_text("a supercalifragilistic b", 5.0, chars);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_explicit_newlines() {
        let lines = wrap_text("first\nsecond line", 100.0, chars);
        assert_eq!(lines, vec!["first", "second line"]);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap_text("", 10.0, chars).is_empty());
        assert!(wrap_text("   \n", 10.0, chars).is_empty());
    }

    #[test]
    fn test_estimate_width() {
        assert_eq!(estimate_width("abcd", 10.0), 4.0 * 10.0 * TEXT_CHAR_WIDTH_RATIO);
    }
}
