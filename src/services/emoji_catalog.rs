//! Read-only emoji catalog
//!
//! Groups, Twemoji image markup and tag search over a static dataset. The
//! dataset is either supplied by the host as JSON or built from the table
//! bundled with the `emojis` crate.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::TwemojiOptions;
use crate::error::WidgetError;
use crate::utils::emoji_text::{split_emoji, twemoji_code, TextSegment};
use crate::utils::html::escape_html;

/// A renderable emoji with its skin-tone variants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emoji {
    pub unicode: String,
    pub img: String,
    #[serde(default)]
    pub skins: Vec<Emoji>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Dataset entry as supplied by the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub unicode: String,
    pub group: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skins: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmojiGroup {
    pub group: u32,
    /// Tab label; emoji in it are rendered as images
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmojiDataset {
    pub groups: Vec<EmojiGroup>,
    pub emojis: Vec<EmojiRecord>,
}

impl EmojiDataset {
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Dataset built from the Unicode table of the `emojis` crate
    ///
    /// Groups follow Unicode order and are labelled with their first emoji.
    /// Tags are the CLDR name plus every GitHub shortcode.
    pub fn bundled() -> Self {
        let mut dataset = Self::default();

        for (index, group) in emojis::Group::iter().enumerate() {
            let id = index as u32;
            let mut label = None;

            for emoji in group.emojis() {
                // Tone variants are listed under their base emoji
                if !matches!(emoji.skin_tone(), None | Some(emojis::SkinTone::Default)) {
                    continue;
                }

                let unicode = emoji.as_str();
                label.get_or_insert_with(|| unicode.to_string());

                let mut tags = vec![emoji.name().to_string()];
                tags.extend(emoji.shortcodes().map(|code| code.replace('_', " ")));

                let skins = emoji
                    .skin_tones()
                    .map(|tones| {
                        tones
                            .map(|tone| tone.as_str())
                            .filter(|tone| *tone != unicode)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();

                dataset.emojis.push(EmojiRecord {
                    unicode: unicode.to_string(),
                    group: id,
                    tags,
                    skins,
                });
            }

            if let Some(description) = label {
                dataset.groups.push(EmojiGroup { group: id, description });
            }
        }

        log::debug!(
            "Bundled emoji dataset: {} groups, {} emojis",
            dataset.groups.len(),
            dataset.emojis.len()
        );
        dataset
    }
}

/// Dataset shared between widgets; equal only to itself
#[derive(Clone, Debug)]
pub struct SharedDataset(pub Rc<EmojiDataset>);

impl SharedDataset {
    pub fn new(dataset: EmojiDataset) -> Self {
        Self(Rc::new(dataset))
    }

    pub fn bundled() -> Self {
        Self::new(EmojiDataset::bundled())
    }
}

impl PartialEq for SharedDataset {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for SharedDataset {
    type Target = EmojiDataset;

    fn deref(&self) -> &EmojiDataset {
        &self.0
    }
}

/// One tab worth of emojis
#[derive(Clone, Debug, PartialEq)]
pub struct EmojiPack {
    pub group: u32,
    pub list: Vec<Emoji>,
}

/// Twemoji `<img>` markup for one emoji
pub fn render_emoji_markup(unicode: &str, options: &TwemojiOptions) -> String {
    format!(
        r#"<img class="emoji" draggable="false" alt="{}" src="{}{}/{}{}"/>"#,
        unicode,
        options.base,
        options.size,
        twemoji_code(unicode),
        options.ext
    )
}

pub struct EmojiCatalog {
    groups: Vec<EmojiGroup>,
    packs: Vec<EmojiPack>,
    options: Option<TwemojiOptions>,
}

impl EmojiCatalog {
    pub fn new(dataset: &EmojiDataset, options: Option<TwemojiOptions>) -> Self {
        let mut packs: Vec<EmojiPack> = Vec::new();

        for record in &dataset.emojis {
            let emoji = Emoji {
                unicode: record.unicode.clone(),
                img: Self::markup(&record.unicode, options.as_ref()),
                skins: record
                    .skins
                    .iter()
                    .map(|skin| Emoji {
                        unicode: skin.clone(),
                        img: Self::markup(skin, options.as_ref()),
                        skins: Vec::new(),
                        tags: record.tags.clone(),
                    })
                    .collect(),
                tags: record.tags.clone(),
            };

            match packs.iter_mut().find(|pack| pack.group == record.group) {
                Some(pack) => pack.list.push(emoji),
                None => packs.push(EmojiPack {
                    group: record.group,
                    list: vec![emoji],
                }),
            }
        }

        Self {
            groups: dataset.groups.clone(),
            packs,
            options,
        }
    }

    fn markup(unicode: &str, options: Option<&TwemojiOptions>) -> String {
        options
            .map(|options| render_emoji_markup(unicode, options))
            .unwrap_or_default()
    }

    /// Emojis partitioned by group, in order of first appearance
    pub fn groups_of(&self) -> &[EmojiPack] {
        &self.packs
    }

    /// Case-insensitive substring match over tags
    ///
    /// A blank term yields the first group.
    pub fn search(&self, term: &str) -> Vec<Emoji> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self
                .packs
                .first()
                .map(|pack| pack.list.clone())
                .unwrap_or_default();
        }

        self.packs
            .iter()
            .flat_map(|pack| pack.list.iter())
            .filter(|emoji| emoji.tags.iter().any(|tag| tag.to_lowercase().contains(&term)))
            .cloned()
            .collect()
    }

    /// Image markup for one emoji, empty until Twemoji options are known
    pub fn image_for(&self, unicode: &str) -> String {
        Self::markup(unicode, self.options.as_ref())
    }

    /// Replace every emoji in already-escaped text with its image markup
    pub fn render_text(&self, escaped: &str) -> String {
        split_emoji(escaped)
            .into_iter()
            .map(|segment| match segment {
                TextSegment::Text(text) => text.to_string(),
                TextSegment::Emoji(emoji) => self.image_for(emoji),
            })
            .collect()
    }

    pub fn group_description(&self, group: u32) -> String {
        self.groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| self.render_text(&escape_html(&g.description)))
            .unwrap_or_default()
    }

    /// Look up an emoji or skin variant by its unicode
    pub fn find(&self, unicode: &str) -> Option<&Emoji> {
        self.packs.iter().flat_map(|pack| pack.list.iter()).find_map(|emoji| {
            if emoji.unicode == unicode {
                Some(emoji)
            } else {
                emoji.skins.iter().find(|skin| skin.unicode == unicode)
            }
        })
    }

    pub fn options(&self) -> Option<&TwemojiOptions> {
        self.options.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> EmojiDataset {
        EmojiDataset::from_json(
            r#"{
                "groups": [
                    {"group": 0, "description": "😀"},
                    {"group": 1, "description": "👋 People"}
                ],
                "emojis": [
                    {"unicode": "😀", "group": 0, "tags": ["grinning face", "smile"]},
                    {"unicode": "👋", "group": 1, "tags": ["Waving Hand"], "skins": ["👋🏻", "👋🏿"]},
                    {"unicode": "😂", "group": 0, "tags": ["face with tears of joy"]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn catalog() -> EmojiCatalog {
        EmojiCatalog::new(&sample_dataset(), Some(TwemojiOptions::default()))
    }

    #[test]
    fn test_groups_preserve_dataset_order() {
        let catalog = catalog();
        let groups = catalog.groups_of();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, 0);
        let unicodes: Vec<_> = groups[0].list.iter().map(|e| e.unicode.as_str()).collect();
        assert_eq!(unicodes, vec!["😀", "😂"]);
        assert_eq!(groups[1].list[0].skins.len(), 2);
    }

    #[test]
    fn test_empty_search_returns_first_group() {
        let catalog = catalog();
        assert_eq!(catalog.search(""), catalog.groups_of()[0].list);
        assert_eq!(catalog.search("   "), catalog.groups_of()[0].list);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = catalog();
        let found = catalog.search("WAV");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].unicode, "👋");

        let faces: Vec<_> = catalog.search("face").into_iter().map(|e| e.unicode).collect();
        assert_eq!(faces, vec!["😀", "😂"]);

        assert!(catalog.search("zebra").is_empty());
    }

    #[test]
    fn test_image_for() {
        let catalog = catalog();
        assert_eq!(
            catalog.image_for("😀"),
            r#"<img class="emoji" draggable="false" alt="😀" src="https://cdnjs.cloudflare.com/ajax/libs/twemoji/14.0.2/72x72/1f600.png"/>"#
        );
    }

    #[test]
    fn test_rendering_without_options_is_empty() {
        let catalog = EmojiCatalog::new(&sample_dataset(), None);
        assert_eq!(catalog.image_for("😀"), "");
        assert_eq!(catalog.render_text("a😀b"), "ab");
        assert_eq!(catalog.groups_of()[0].list[0].img, "");
    }

    #[test]
    fn test_render_text_and_description() {
        let catalog = catalog();
        let rendered = catalog.render_text("hi &amp; 😂");
        assert!(rendered.starts_with("hi &amp; <img"));
        assert!(rendered.contains("1f602.png"));

        let description = catalog.group_description(1);
        assert!(description.contains(r#"alt="👋""#));
        assert!(description.ends_with(" People"));
        assert_eq!(catalog.group_description(9), "");
    }

    #[test]
    fn test_find_includes_skins() {
        let catalog = catalog();
        assert_eq!(catalog.find("👋🏿").map(|e| e.unicode.as_str()), Some("👋🏿"));
        assert!(catalog.find("🦀").is_none());
    }

    #[test]
    fn test_malformed_dataset() {
        assert!(matches!(
            EmojiDataset::from_json("[1, 2"),
            Err(WidgetError::Serialization(_))
        ));
    }

    #[test]
    fn test_bundled_dataset() {
        let dataset = EmojiDataset::bundled();
        assert!(!dataset.groups.is_empty());

        let catalog = EmojiCatalog::new(&dataset, Some(TwemojiOptions::default()));
        assert_eq!(catalog.groups_of().len(), dataset.groups.len());
        assert!(catalog.find("😀").is_some());
        assert!(catalog.search("grinning").iter().any(|e| e.unicode == "😀"));

        let thumbs = catalog.find("👍").unwrap();
        assert!(!thumbs.skins.is_empty());
        assert!(thumbs.skins.iter().all(|skin| skin.unicode != "👍"));
    }
}
