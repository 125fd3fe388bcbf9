//! Most-recently-used emoji list
//!
//! Bounded, most-recent-first and unique by unicode. The whole list is
//! written back as a JSON array after every change.

use std::rc::Rc;

use crate::services::emoji_catalog::Emoji;
use crate::stores::storage::StorageBackend;

pub struct RecentEmojiStore {
    backend: Rc<dyn StorageBackend>,
    key: String,
    limit: usize,
    list: Vec<Emoji>,
}

impl RecentEmojiStore {
    pub fn new(backend: Rc<dyn StorageBackend>, key: impl Into<String>, limit: usize) -> Self {
        Self {
            backend,
            key: key.into(),
            limit,
            list: Vec::new(),
        }
    }

    /// Read the persisted list, replacing the in-memory one
    ///
    /// Absent, unreadable or malformed data yields an empty list.
    pub fn load(&mut self) -> &[Emoji] {
        self.list = match self.backend.get(&self.key) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Emoji>>(&json) {
                Ok(mut list) => {
                    list.truncate(self.limit);
                    list
                }
                Err(e) => {
                    log::warn!("Ignoring malformed recent emojis under {:?}: {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read recent emojis: {}", e);
                Vec::new()
            }
        };
        &self.list
    }

    /// Move `emoji` to the front, dropping the oldest entries past the limit
    pub fn record(&mut self, emoji: Emoji) {
        self.list.retain(|e| e.unicode != emoji.unicode);
        self.list.insert(0, emoji);
        if self.list.len() > self.limit {
            self.list.truncate(self.limit);
        }
        self.persist();
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.list) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize recent emojis: {}", e);
                return;
            }
        };
        if let Err(e) = self.backend.set(&self.key, &json) {
            log::warn!("Failed to persist recent emojis: {}", e);
        }
    }

    pub fn list(&self) -> &[Emoji] {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
