pub mod recent_emojis;
pub mod storage;

pub use recent_emojis::RecentEmojiStore;
pub use storage::{backend_for, BrowserStorage, MemoryStorage, NoStorage, StorageBackend};
