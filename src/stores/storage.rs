//! Key-value storage backends for persisted widget state

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::StorageKind;
use crate::error::WidgetError;

pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, WidgetError>;
    fn set(&self, key: &str, value: &str) -> Result<(), WidgetError>;
}

/// Backend for `StorageKind::None`: forgets everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStorage;

impl StorageBackend for NoStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, WidgetError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), WidgetError> {
        Ok(())
    }
}

/// Browser `localStorage` or `sessionStorage`
///
/// Values are stored as-is, without the JSON wrapping of the typed
/// `gloo_storage` accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserStorage {
    Local,
    Session,
}

impl StorageBackend for BrowserStorage {
    #[cfg(target_family = "wasm")]
    fn get(&self, key: &str) -> Result<Option<String>, WidgetError> {
        use gloo_storage::{LocalStorage, SessionStorage, Storage};

        let raw = match self {
            BrowserStorage::Local => LocalStorage::raw(),
            BrowserStorage::Session => SessionStorage::raw(),
        };
        raw.get_item(key)
            .map_err(|e| WidgetError::storage(format!("{:?}", e)))
    }

    #[cfg(target_family = "wasm")]
    fn set(&self, key: &str, value: &str) -> Result<(), WidgetError> {
        use gloo_storage::{LocalStorage, SessionStorage, Storage};

        let raw = match self {
            BrowserStorage::Local => LocalStorage::raw(),
            BrowserStorage::Session => SessionStorage::raw(),
        };
        raw.set_item(key, value)
            .map_err(|e| WidgetError::storage(format!("{:?}", e)))
    }

    #[cfg(not(target_family = "wasm"))]
    fn get(&self, _key: &str) -> Result<Option<String>, WidgetError> {
        Err(WidgetError::storage("browser storage is not available"))
    }

    #[cfg(not(target_family = "wasm"))]
    fn set(&self, _key: &str, _value: &str) -> Result<(), WidgetError> {
        Err(WidgetError::storage("browser storage is not available"))
    }
}

/// Process-local backend; clones share the same map
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, WidgetError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WidgetError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend for the configured storage kind
pub fn backend_for(kind: StorageKind) -> Rc<dyn StorageBackend> {
    match kind {
        StorageKind::None => Rc::new(NoStorage),
        StorageKind::Local => Rc::new(BrowserStorage::Local),
        StorageKind::Session => Rc::new(BrowserStorage::Session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_storage_forgets() {
        let backend = backend_for(StorageKind::None);
        backend.set("key", "value").unwrap();
        assert_eq!(backend.get("key").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_shared_between_clones() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set("key", "[1]").unwrap();
        assert_eq!(other.get("key").unwrap().as_deref(), Some("[1]"));
    }
}
