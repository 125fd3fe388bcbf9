//! Widget error types
//!
//! None of the widget operations surface these to the host: storage and
//! data failures are logged and degraded. Only config parsing and direct
//! storage-backend calls return them.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// Storage backend unavailable or rejected the operation
    Storage(String),
    /// JSON (de)serialization failed
    Serialization(String),
    /// Invalid configuration value
    Config(String),
}

impl WidgetError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            WidgetError::storage("quota exceeded").to_string(),
            "Storage error: quota exceeded"
        );
        assert_eq!(
            WidgetError::config("bad placement").to_string(),
            "Invalid configuration: bad placement"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let widget_err: WidgetError = err.into();
        assert!(matches!(widget_err, WidgetError::Serialization(_)));
    }
}
