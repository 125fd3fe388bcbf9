//! Emoji detection inside free text
//!
//! Text is split on extended grapheme clusters; a cluster is an emoji when
//! the `emojis` table knows it (with or without the U+FE0F presentation
//! selector). Plain ASCII never counts as an emoji, so digits, `#` and `*`
//! stay text unless they are part of a keycap sequence.

use unicode_segmentation::UnicodeSegmentation;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSegment<'a> {
    Text(&'a str),
    Emoji(&'a str),
}

/// Whether a single grapheme cluster is an emoji
pub fn is_emoji(grapheme: &str) -> bool {
    if grapheme.is_ascii() {
        return false;
    }

    if emojis::get(grapheme).is_some() {
        return true;
    }

    if grapheme.contains(VARIATION_SELECTOR_16) {
        let bare: String = grapheme.chars().filter(|c| *c != VARIATION_SELECTOR_16).collect();
        return emojis::get(&bare).is_some();
    }

    let mut qualified = String::with_capacity(grapheme.len() + 3);
    qualified.push_str(grapheme);
    qualified.push(VARIATION_SELECTOR_16);
    emojis::get(&qualified).is_some()
}

/// Split text into runs of plain text and individual emoji
///
/// Adjacent non-emoji graphemes are merged into a single `Text` run.
pub fn split_emoji(text: &str) -> Vec<TextSegment<'_>> {
    let mut segments = Vec::new();
    let mut text_start: Option<usize> = None;

    for (offset, grapheme) in text.grapheme_indices(true) {
        if is_emoji(grapheme) {
            if let Some(start) = text_start.take() {
                segments.push(TextSegment::Text(&text[start..offset]));
            }
            segments.push(TextSegment::Emoji(grapheme));
        } else if text_start.is_none() {
            text_start = Some(offset);
        }
    }

    if let Some(start) = text_start {
        segments.push(TextSegment::Text(&text[start..]));
    }

    segments
}

/// Twemoji asset code for an emoji: lowercase hex code points joined by `-`
///
/// The presentation selector is dropped unless the sequence is joined with
/// U+200D, matching the file names of the Twemoji asset set.
pub fn twemoji_code(emoji: &str) -> String {
    let keep_selector = emoji.contains(ZERO_WIDTH_JOINER);

    emoji
        .chars()
        .filter(|c| keep_selector || *c != VARIATION_SELECTOR_16)
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_emoji() {
        assert!(is_emoji("😀"));
        assert!(is_emoji("❤️"));
        assert!(is_emoji("👍🏽"));
        assert!(!is_emoji("a"));
        assert!(!is_emoji("1"));
        assert!(!is_emoji("é"));
    }

    #[test]
    fn test_split_emoji() {
        let segments = split_emoji("hi 😀😂 there");
        assert_eq!(
            segments,
            vec![
                TextSegment::Text("hi "),
                TextSegment::Emoji("😀"),
                TextSegment::Emoji("😂"),
                TextSegment::Text(" there"),
            ]
        );
    }

    #[test]
    fn test_split_keeps_zwj_sequence_whole() {
        let segments = split_emoji("👨‍👩‍👧");
        assert_eq!(segments, vec![TextSegment::Emoji("👨‍👩‍👧")]);
    }

    #[test]
    fn test_split_plain_text() {
        assert_eq!(split_emoji("plain"), vec![TextSegment::Text("plain")]);
        assert!(split_emoji("").is_empty());
    }

    #[test]
    fn test_twemoji_code() {
        assert_eq!(twemoji_code("😀"), "1f600");
        // Selector dropped outside ZWJ sequences
        assert_eq!(twemoji_code("❤️"), "2764");
        assert_eq!(twemoji_code("👍🏽"), "1f44d-1f3fd");
        assert_eq!(twemoji_code("🏳️‍🌈"), "1f3f3-fe0f-200d-1f308");
    }
}
