// Services
// Positioning, emoji data, click-away detection and DOM access

pub mod emoji_catalog;
pub mod outside_click;
pub mod positioning;
pub mod surface;

#[cfg(target_family = "wasm")]
pub mod dom;

pub use emoji_catalog::{
    render_emoji_markup, Emoji, EmojiCatalog, EmojiDataset, EmojiGroup, EmojiPack, EmojiRecord, SharedDataset,
};
pub use outside_click::OutsideInteractionDetector;
pub use positioning::{Placement, PlacementEngine, PositionHandle, PositioningAdapter, PositioningConfig};
pub use surface::{EditableSurface, MemorySelection, MemorySurface, SelectionService};
