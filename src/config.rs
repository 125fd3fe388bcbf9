//! Widget configuration
//!
//! Immutable value objects for every option the widgets recognize. Each
//! struct deserializes from JSON with per-field defaults, so a host only
//! writes the options it wants to change.

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::services::positioning::{Placement, PositioningConfig};

pub const DEFAULT_PICKER_WIDTH: u32 = 250;
pub const DEFAULT_PICKER_HEIGHT: u32 = 150;
pub const DEFAULT_STORAGE_KEY: &str = "vue-recent-twemojis";
pub const DEFAULT_RECENT_LIMIT: usize = 12;
pub const DEFAULT_TWEMOJI_PATH: &str = "https://cdnjs.cloudflare.com/ajax/libs/twemoji/14.0.2/";
pub const DEFAULT_TWEMOJI_EXTENSION: &str = ".png";
pub const DEFAULT_TWEMOJI_FOLDER: &str = "72x72";
pub const DEFAULT_PADDING_OFFSET: i32 = 5;

const ALLOWED_EXTENSIONS: &[&str] = &[".png", ".svg", ".jpg", ".jpeg", ".ico"];

pub const DEFAULT_RANDOM_EMOJIS: &[&str] = &[
    "😀", "😃", "😄", "😁", "😆", "😅", "🤣", "😂", "🙂", "🙃",
    "😉", "😊", "🥴", "😵", "🤯", "🤠", "🥳", "😎", "🤓", "🧐",
];

/// How the trigger element opens the popup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Click,
    Hover,
}

/// Where recent emojis are persisted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    None,
    Session,
    Local,
}

/// Picker panel width: fixed pixels or the width of another element
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickerWidth {
    Fixed(u32),
    /// Element id, with or without a leading `#`
    MatchElement(String),
}

impl Default for PickerWidth {
    fn default() -> Self {
        PickerWidth::Fixed(DEFAULT_PICKER_WIDTH)
    }
}

impl PickerWidth {
    /// Resolve to pixels, measuring the referenced element when needed
    ///
    /// Falls back to the default width when the element cannot be measured.
    pub fn resolve<F>(&self, measure: F) -> u32
    where
        F: FnOnce(&str) -> Option<f64>,
    {
        match self {
            PickerWidth::Fixed(px) => *px,
            PickerWidth::MatchElement(selector) => {
                let id = selector.trim_start_matches('#');
                measure(id)
                    .filter(|w| *w > 0.0)
                    .map(|w| w.round() as u32)
                    .unwrap_or(DEFAULT_PICKER_WIDTH)
            }
        }
    }
}

/// Template inputs for Twemoji image URLs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwemojiOptions {
    pub base: String,
    pub ext: String,
    pub size: String,
}

impl Default for TwemojiOptions {
    fn default() -> Self {
        Self {
            base: DEFAULT_TWEMOJI_PATH.to_string(),
            ext: DEFAULT_TWEMOJI_EXTENSION.to_string(),
            size: DEFAULT_TWEMOJI_FOLDER.to_string(),
        }
    }
}

/// Behavioural flags of one popup instance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopupConfig {
    pub disabled: bool,
    pub trigger: TriggerType,
    pub close_on_clickaway: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub disabled: bool,
    pub width: PickerWidth,
    pub height: u32,
    pub placement: Placement,
    pub arrow_enabled: bool,
    pub auto_flip: bool,
    pub close_on_clickaway: bool,
    pub trigger: TriggerType,
    pub skins_selection: bool,
    pub recent_emojis_feat: bool,
    pub recent_emojis_storage: StorageKind,
    pub recent_emoji_storage_name: String,
    pub recent_emoji_limit: usize,
    pub search_emojis_feat: bool,
    pub search_emoji_placeholder: String,
    pub is_loading_label: String,
    pub search_emoji_not_found: String,
    pub twemoji_path: String,
    pub twemoji_extension: String,
    pub twemoji_folder: String,
    pub random_emoji_array: Vec<String>,
    pub padding_offset: i32,
    pub emoji_text_weight_changed: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            width: PickerWidth::default(),
            height: DEFAULT_PICKER_HEIGHT,
            placement: Placement::TopStart,
            arrow_enabled: true,
            auto_flip: true,
            close_on_clickaway: true,
            trigger: TriggerType::Click,
            skins_selection: false,
            recent_emojis_feat: false,
            recent_emojis_storage: StorageKind::None,
            recent_emoji_storage_name: DEFAULT_STORAGE_KEY.to_string(),
            recent_emoji_limit: DEFAULT_RECENT_LIMIT,
            search_emojis_feat: false,
            search_emoji_placeholder: "Search emojis.".to_string(),
            is_loading_label: "Loading...".to_string(),
            search_emoji_not_found: "No emojis found.".to_string(),
            twemoji_path: DEFAULT_TWEMOJI_PATH.to_string(),
            twemoji_extension: DEFAULT_TWEMOJI_EXTENSION.to_string(),
            twemoji_folder: DEFAULT_TWEMOJI_FOLDER.to_string(),
            random_emoji_array: DEFAULT_RANDOM_EMOJIS.iter().map(|e| e.to_string()).collect(),
            padding_offset: DEFAULT_PADDING_OFFSET,
            emoji_text_weight_changed: false,
        }
    }
}

impl PickerConfig {
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WidgetError> {
        if self.recent_emoji_limit == 0 {
            return Err(WidgetError::config("recent_emoji_limit must be at least 1"));
        }
        if !ALLOWED_EXTENSIONS.contains(&self.twemoji_extension.as_str()) {
            return Err(WidgetError::config(format!(
                "unsupported twemoji_extension {:?}",
                self.twemoji_extension
            )));
        }
        if self.recent_emoji_storage_name.is_empty() {
            return Err(WidgetError::config("recent_emoji_storage_name must not be empty"));
        }
        Ok(())
    }

    pub fn popup_config(&self) -> PopupConfig {
        PopupConfig {
            disabled: self.disabled,
            trigger: self.trigger,
            close_on_clickaway: self.close_on_clickaway,
        }
    }

    pub fn positioning_config(&self) -> PositioningConfig {
        PositioningConfig {
            placement: self.placement,
            auto_flip: self.auto_flip,
            arrow_enabled: self.arrow_enabled,
            extra_offset: self.padding_offset,
        }
    }

    pub fn twemoji_options(&self) -> TwemojiOptions {
        TwemojiOptions {
            base: self.twemoji_path.clone(),
            ext: self.twemoji_extension.clone(),
            size: self.twemoji_folder.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextareaConfig {
    pub id_textarea: String,
    pub initial_content: String,
    pub enable_send_btn: bool,
    pub textarea_disabled: bool,
    pub component_color: String,
    pub placeholder: String,
    pub maxlength: Option<usize>,
    /// The textarea turns emoji search on unless told otherwise
    pub search_emojis_feat: bool,
    pub picker: PickerConfig,
}

impl Default for TextareaConfig {
    fn default() -> Self {
        Self {
            id_textarea: "twemoji-textarea-outer".to_string(),
            initial_content: String::new(),
            enable_send_btn: false,
            textarea_disabled: false,
            component_color: "#F7F7F7".to_string(),
            placeholder: String::new(),
            maxlength: None,
            search_emojis_feat: true,
            picker: PickerConfig::default(),
        }
    }
}

impl TextareaConfig {
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        let config: Self = serde_json::from_str(json)?;
        config.picker.validate()?;
        Ok(config)
    }

    /// Picker options with the textarea's search flag applied
    pub fn picker_config(&self) -> PickerConfig {
        PickerConfig {
            search_emojis_feat: self.search_emojis_feat,
            ..self.picker.clone()
        }
    }
}
