//! Twemoji picker popup and emoji-aware rich text area for Dioxus
//!
//! The widgets in [`components`] are thin shells over the headless
//! controllers in [`controllers`], which own all state and timing and are
//! tested without a browser.

#![allow(non_snake_case)]

pub mod components;
pub mod config;
pub mod controllers;
pub mod error;
pub mod services;
pub mod stores;
pub mod utils;

pub use components::{PopupEmoji, TwemojiPicker, TwemojiTextarea};
pub use config::{PickerConfig, PickerWidth, StorageKind, TextareaConfig, TriggerType, TwemojiOptions};
pub use error::WidgetError;
pub use services::emoji_catalog::{Emoji, EmojiCatalog, EmojiDataset, SharedDataset};
pub use services::positioning::Placement;
