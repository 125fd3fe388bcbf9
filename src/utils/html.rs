//! Markup helpers for the editable surface
//!
//! The surface holds escaped text interleaved with Twemoji `<img>` tags.
//! These helpers convert between that markup and plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static EMOJI_IMG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]*?\balt="([^"]*)"[^>]*>"#).expect("valid emoji img pattern"));

static LINE_BREAK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break pattern"));

/// Escape HTML metacharacters so text is inserted literally
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverse of [`escape_html`], also folding `&nbsp;` into a plain space
pub fn unescape_html(markup: &str) -> String {
    markup
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Replace every emoji `<img>` with the unicode stored in its `alt`
pub fn replace_emoji_with_alt(markup: &str) -> String {
    EMOJI_IMG_PATTERN.replace_all(markup, "$1").into_owned()
}

/// Plain-text form of surface markup
///
/// Emoji images become their unicode, `<br>` becomes a newline and entities
/// are unescaped.
pub fn markup_to_text(markup: &str) -> String {
    let text = replace_emoji_with_alt(markup);
    let text = LINE_BREAK_PATTERN.replace_all(&text, "\n");
    unescape_html(&text)
}

/// Sanitize host-provided markup before it is written into the surface
///
/// Only Twemoji images and line breaks survive; everything else is reduced
/// to its text content.
pub fn sanitize_surface_markup(markup: &str) -> String {
    use ammonia::Builder;
    use maplit::{hashmap, hashset};

    Builder::default()
        .tags(hashset!["img", "br"])
        .tag_attributes(hashmap![
            "img" => hashset!["class", "alt", "src", "draggable"],
        ])
        .generic_attributes(hashset![])
        .url_schemes(hashset!["http", "https"])
        .link_rel(None)
        .clean(markup)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain 😀"), "plain 😀");
    }

    #[test]
    fn test_unescape_round_trip_of_metacharacters() {
        let text = r#"<script>alert("x")</script> & 'y'"#;
        assert_eq!(unescape_html(&escape_html(text)), text);
    }

    #[test]
    fn test_unescape_does_not_double_decode() {
        // "&amp;lt;" is the escaped form of the literal text "&lt;"
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_replace_emoji_with_alt() {
        let markup = r#"hi <img class="emoji" draggable="false" alt="😀" src="https://x/72x72/1f600.png"/>!"#;
        assert_eq!(replace_emoji_with_alt(markup), "hi 😀!");
    }

    #[test]
    fn test_markup_to_text() {
        let markup = r#"a &amp; b<br><img alt="🎉" src="x.png">"#;
        assert_eq!(markup_to_text(markup), "a & b\n🎉");
    }

    #[test]
    fn test_sanitize_surface_markup() {
        let markup = r#"<b>bold</b><script>evil()</script><img class="emoji" alt="😀" src="https://x/1f600.png" onerror="evil()">"#;
        let clean = sanitize_surface_markup(markup);
        assert!(clean.starts_with("bold"));
        assert!(!clean.contains("script"));
        assert!(!clean.contains("onerror"));
        assert!(clean.contains(r#"alt="😀""#));
    }
}
