// Utility functions
// Timers, text and markup helpers shared by the widgets

pub mod debounce;
pub mod emoji_text;
pub mod html;
pub mod scheduler;
pub mod weighted_length;

pub use debounce::Debouncer;
pub use emoji_text::{is_emoji, split_emoji, twemoji_code, TextSegment};
pub use html::{escape_html, markup_to_text, sanitize_surface_markup};
pub use scheduler::{BrowserScheduler, ManualScheduler, Scheduler, TimerHandle};
pub use weighted_length::{weighted_length, LengthWeighting};

/// Generate a unique element id with the given prefix
///
/// Used to link popups to their trigger and panel elements.
pub fn generate_element_id(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_element_id() {
        let a = generate_element_id("popup");
        let b = generate_element_id("popup");
        assert!(a.starts_with("popup-"));
        assert_ne!(a, b);
    }
}
