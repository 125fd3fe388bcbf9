//! Weighted text length for the tweet-style character limit
//!
//! Text is NFC-normalized and then weighed one UTF-16 code unit at a time,
//! the way tweet counters do it. `Default` weighting follows the Twitter v3
//! text configuration: Latin and common punctuation weigh 1, any other unit
//! (surrogate halves included) weighs 2, an emoji sequence weighs 2
//! regardless of its length and every URL counts as 23.
//! `Uniform` weighting counts every UTF-16 unit as 1 and URLs as written.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use super::emoji_text::is_emoji;

static URL_WITH_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s]+").expect("valid url pattern"));

static URL_WITHOUT_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)((?:[a-z0-9](?:[a-z0-9_-]*[a-z0-9])?\.)+)([a-z]{2,})(/[^\s]*)?")
        .expect("valid domain pattern")
});

const GENERIC_TLDS: &[&str] = &[
    "aero", "app", "art", "asia", "biz", "blog", "cat", "cloud", "club", "com", "coop", "design", "dev",
    "edu", "email", "gov", "info", "int", "jobs", "live", "media", "mil", "mobi", "museum", "name", "net",
    "news", "online", "org", "page", "pro", "shop", "site", "social", "store", "tech", "tel", "travel",
    "xxx", "xyz",
];

const COUNTRY_TLDS: &str = "ac ad ae af ag ai al am ao aq ar as at au aw ax az ba bb bd be bf bg bh bi bj \
    bm bn bo br bs bt bw by bz ca cc cd cf cg ch ci ck cl cm cn co cr cu cv cw cx cy cz de dj dk dm do dz \
    ec ee eg er es et eu fi fj fk fm fo fr ga gb gd ge gf gg gh gi gl gm gn gp gq gr gs gt gu gw gy hk hm \
    hn hr ht hu id ie il im in io iq ir is it je jm jo jp ke kg kh ki km kn kp kr kw ky kz la lb lc li lk \
    lr ls lt lu lv ly ma mc md me mg mh mk ml mm mn mo mp mq mr ms mt mu mv mw mx my mz na nc ne nf ng ni \
    nl no np nr nu nz om pa pe pf pg ph pk pl pm pn pr ps pt pw py qa re ro rs ru rw sa sb sc sd se sg sh \
    si sk sl sm sn so sr ss st su sv sx sy sz tc td tf tg th tj tk tl tm tn to tr tt tv tw tz ua ug uk us \
    uy uz va vc ve vg vi vn vu wf ws ye yt za zm zw";

// Country domains that count as links even with a single label and no path
const SHORT_COUNTRY_TLDS: &[&str] = &["co", "tv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthWeighting {
    #[default]
    Default,
    Uniform,
}

impl LengthWeighting {
    /// Weighting selected by the `emoji_text_weight_changed` option
    pub fn from_weight_changed(weight_changed: bool) -> Self {
        if weight_changed {
            Self::Uniform
        } else {
            Self::Default
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WeightRange {
    start: u32,
    end: u32,
    weight: u32,
}

#[derive(Debug, Clone, Copy)]
struct WeightConfig {
    scale: u32,
    default_weight: u32,
    ranges: &'static [WeightRange],
    emoji_parsing: bool,
    transformed_url_length: Option<usize>,
}

const TWITTER_V3_RANGES: &[WeightRange] = &[
    WeightRange { start: 0, end: 4351, weight: 100 },
    WeightRange { start: 8192, end: 8205, weight: 100 },
    WeightRange { start: 8208, end: 8223, weight: 100 },
    WeightRange { start: 8242, end: 8247, weight: 100 },
];

const TWITTER_V3: WeightConfig = WeightConfig {
    scale: 100,
    default_weight: 200,
    ranges: TWITTER_V3_RANGES,
    emoji_parsing: true,
    transformed_url_length: Some(23),
};

const UNIFORM: WeightConfig = WeightConfig {
    scale: 100,
    default_weight: 100,
    ranges: &[],
    emoji_parsing: false,
    transformed_url_length: None,
};

impl WeightConfig {
    fn unit_weight(&self, unit: u16) -> u64 {
        let code = unit as u32;
        self.ranges
            .iter()
            .find(|r| code >= r.start && code <= r.end)
            .map_or(self.default_weight, |r| r.weight) as u64
    }

    fn plain_weight(&self, text: &str) -> u64 {
        text.encode_utf16().map(|unit| self.unit_weight(unit)).sum()
    }

    fn text_weight(&self, text: &str) -> u64 {
        if !self.emoji_parsing {
            return self.plain_weight(text);
        }

        text.graphemes(true)
            .map(|g| {
                if is_emoji(g) {
                    self.default_weight as u64
                } else {
                    self.plain_weight(g)
                }
            })
            .sum()
    }
}

fn trim_trailing_punctuation(text: &str, range: Range<usize>) -> Range<usize> {
    let trimmed = text[range.clone()]
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"'));
    range.start..range.start + trimmed.len()
}

fn is_known_tld(tld: &str) -> bool {
    GENERIC_TLDS.contains(&tld) || is_country_tld(tld)
}

fn is_country_tld(tld: &str) -> bool {
    tld.len() == 2 && COUNTRY_TLDS.split_whitespace().any(|code| code == tld)
}

/// Byte ranges of the links in `text`, in order
///
/// Bare domains such as `example.com` count when their top-level domain is
/// known. A single-label country domain needs a path to count, except for the
/// short-link domains in [`SHORT_COUNTRY_TLDS`].
fn find_urls(text: &str) -> Vec<Range<usize>> {
    let mut urls: Vec<Range<usize>> = URL_WITH_SCHEME
        .find_iter(text)
        .map(|m| trim_trailing_punctuation(text, m.range()))
        .collect();

    for caps in URL_WITHOUT_SCHEME.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if urls.iter().any(|url| url.start < whole.end() && whole.start() < url.end) {
            continue;
        }

        let preceding = text[..whole.start()].chars().next_back();
        if preceding.is_some_and(|c| {
            c.is_alphanumeric() || matches!(c, '@' | '$' | '#' | '-' | '_' | '.' | '/' | '\u{202A}'..='\u{202E}')
        }) {
            continue;
        }

        let labels = caps.get(1).map_or("", |m| m.as_str());
        let Some(tld) = caps.get(2) else { continue };
        let tld_lower = tld.as_str().to_ascii_lowercase();
        if !is_known_tld(&tld_lower) {
            continue;
        }

        let has_path = caps.get(3).is_some();
        if !has_path {
            let following = text[tld.end()..].chars().next();
            if following.is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '+' | '-' | '_')) {
                continue;
            }
            let single_label = labels.matches('.').count() == 1;
            if single_label && is_country_tld(&tld_lower) && !SHORT_COUNTRY_TLDS.contains(&tld_lower.as_str()) {
                continue;
            }
        }

        urls.push(trim_trailing_punctuation(text, whole.range()));
    }

    urls.sort_by_key(|url| url.start);
    urls
}

/// Weighted length of `text` under the chosen weighting
pub fn weighted_length(text: &str, weighting: LengthWeighting) -> usize {
    let config = match weighting {
        LengthWeighting::Default => TWITTER_V3,
        LengthWeighting::Uniform => UNIFORM,
    };
    let text: String = text.nfc().collect();

    let Some(url_length) = config.transformed_url_length else {
        return (config.text_weight(&text) / config.scale as u64) as usize;
    };

    let mut total: u64 = 0;
    let mut last_end = 0;
    for url in find_urls(&text) {
        total += config.text_weight(&text[last_end..url.start]);
        total += url_length as u64 * config.scale as u64;
        last_end = url.end;
    }
    total += config.text_weight(&text[last_end..]);

    (total / config.scale as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_text() {
        assert_eq!(weighted_length("", LengthWeighting::Default), 0);
        assert_eq!(weighted_length("hello world", LengthWeighting::Default), 11);
        assert_eq!(weighted_length("hello world", LengthWeighting::Uniform), 11);
    }

    #[test]
    fn test_cjk_counts_double_by_default() {
        assert_eq!(weighted_length("日本語", LengthWeighting::Default), 6);
        assert_eq!(weighted_length("日本語", LengthWeighting::Uniform), 3);
    }

    #[test]
    fn test_emoji_sequence_counts_once() {
        assert_eq!(weighted_length("😀", LengthWeighting::Default), 2);
        assert_eq!(weighted_length("👨‍👩‍👧", LengthWeighting::Default), 2);
    }

    #[test]
    fn test_uniform_counts_utf16_units() {
        // One astral code point is a surrogate pair
        assert_eq!(weighted_length("😀", LengthWeighting::Uniform), 2);
        // Three astral emoji joined by two zero-width joiners
        assert_eq!(weighted_length("👨‍👩‍👧", LengthWeighting::Uniform), 8);
    }

    #[test]
    fn test_astral_text_counts_both_halves() {
        // MATHEMATICAL BOLD CAPITAL A is not an emoji
        assert_eq!(weighted_length("\u{1D400}", LengthWeighting::Default), 4);
        assert_eq!(weighted_length("\u{1D400}", LengthWeighting::Uniform), 2);
    }

    #[test]
    fn test_text_is_normalized_first() {
        // e followed by a combining acute accent composes to a single unit
        assert_eq!(weighted_length("e\u{301}", LengthWeighting::Default), 1);
        assert_eq!(weighted_length("e\u{301}", LengthWeighting::Uniform), 1);
    }

    #[test]
    fn test_urls() {
        let text = "see https://example.com/a/very/long/path/indeed";
        assert_eq!(weighted_length(text, LengthWeighting::Default), 4 + 23);
        assert_eq!(weighted_length(text, LengthWeighting::Uniform), text.encode_utf16().count());
    }

    #[test]
    fn test_bare_domains() {
        assert_eq!(weighted_length("see example.com", LengthWeighting::Default), 4 + 23);
        assert_eq!(weighted_length("see example.com.", LengthWeighting::Default), 4 + 23 + 1);
        assert_eq!(weighted_length("www.example.jp", LengthWeighting::Default), 23);
        assert_eq!(weighted_length("t.co/abc", LengthWeighting::Default), 23);
        assert_eq!(weighted_length("example.tv", LengthWeighting::Default), 23);
        assert_eq!(weighted_length("see example.com", LengthWeighting::Uniform), 15);
    }

    #[test]
    fn test_text_that_is_not_a_link() {
        // Single-label country domain without a path
        assert_eq!(weighted_length("example.jp", LengthWeighting::Default), 10);
        // Unknown top-level domain
        assert_eq!(weighted_length("file.txt", LengthWeighting::Default), 8);
        // Mail addresses
        assert_eq!(weighted_length("me@example.com", LengthWeighting::Default), 14);
    }

    #[test]
    fn test_general_punctuation_range() {
        // U+2014 EM DASH sits inside 8208..=8223
        assert_eq!(weighted_length("\u{2014}", LengthWeighting::Default), 1);
        // U+2022 BULLET sits outside every range
        assert_eq!(weighted_length("\u{2022}", LengthWeighting::Default), 2);
    }

    #[test]
    fn test_from_weight_changed() {
        assert_eq!(LengthWeighting::from_weight_changed(true), LengthWeighting::Uniform);
        assert_eq!(LengthWeighting::from_weight_changed(false), LengthWeighting::Default);
    }
}
