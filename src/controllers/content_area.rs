//! Content-editable text area with inline emoji images
//!
//! Insertion, paste, Enter handling and weighted length over an
//! [`EditableSurface`]. Every operation returns the host notifications it
//! produced, in emission order: content observers first, then length.

use std::rc::Rc;

use crate::services::emoji_catalog::EmojiCatalog;
use crate::services::surface::{EditableSurface, SelectionService};
use crate::utils::html::{escape_html, markup_to_text, sanitize_surface_markup};
use crate::utils::weighted_length::{weighted_length, LengthWeighting};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentEvent {
    /// Raw surface markup
    ContentChanged(String),
    /// Plain text with emoji as unicode
    ContentUpdated(String),
    LengthChanged(usize),
    Overflow(bool),
    EnterKey,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentLengthState {
    pub actual_length: usize,
    pub max_length: Option<usize>,
}

impl ContentLengthState {
    pub fn exceeds(&self) -> bool {
        self.max_length.map_or(false, |max| self.actual_length > max)
    }

    /// `actual/max`, or `None` without a maximum
    pub fn indicator(&self) -> Option<String> {
        self.max_length.map(|max| format!("{}/{}", self.actual_length, max))
    }
}

/// Result of a key press
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyAction {
    pub prevent_default: bool,
    pub events: Vec<ContentEvent>,
}

pub struct EditableContentArea<S: EditableSurface, Sel: SelectionService> {
    surface: S,
    selection: Sel,
    catalog: Rc<EmojiCatalog>,
    snapshot: Option<Sel::Snapshot>,
    weighting: LengthWeighting,
    length: ContentLengthState,
    overflowed: bool,
}

impl<S: EditableSurface, Sel: SelectionService> EditableContentArea<S, Sel> {
    pub fn new(
        surface: S,
        selection: Sel,
        catalog: Rc<EmojiCatalog>,
        maxlength: Option<usize>,
        weighting: LengthWeighting,
    ) -> Self {
        Self {
            surface,
            selection,
            catalog,
            snapshot: None,
            weighting,
            length: ContentLengthState {
                actual_length: 0,
                max_length: maxlength,
            },
            overflowed: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn set_maxlength(&mut self, maxlength: Option<usize>) {
        self.length.max_length = maxlength;
    }

    pub fn set_weighting(&mut self, weighting: LengthWeighting) {
        self.weighting = weighting;
    }

    pub fn length_state(&self) -> ContentLengthState {
        self.length
    }

    /// Overflow as of the last check; not updated by plain input
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn save_selection(&mut self) {
        if let Some(snapshot) = self.selection.capture() {
            self.snapshot = Some(snapshot);
        }
    }

    /// Put the caret back where it was last saved
    ///
    /// A snapshot from replaced content is discarded and the caret goes to
    /// the end instead.
    pub fn restore_selection(&mut self) -> bool {
        let restored = self
            .snapshot
            .as_ref()
            .map_or(false, |snapshot| self.selection.restore(snapshot));
        if !restored {
            self.snapshot = None;
            self.selection.place_at_end();
        }
        restored
    }

    fn focus(&mut self) {
        self.surface.focus();
        if !self.surface.has_children() {
            self.surface.prepare_empty();
        }
        self.restore_selection();
    }

    /// Insert text at the caret, expanding emoji into images
    pub fn insert_at_caret(&mut self, text: &str) -> Vec<ContentEvent> {
        if !self.surface.is_mounted() {
            return Vec::new();
        }
        self.focus();

        let markup = self.catalog.render_text(&escape_html(text));
        self.surface.insert_html(&markup);
        self.save_selection();
        self.handle_input()
    }

    /// [`insert_at_caret`](Self::insert_at_caret), then drop focus
    pub fn insert_and_blur(&mut self, text: &str) -> Vec<ContentEvent> {
        let events = self.insert_at_caret(text);
        self.surface.blur();
        events
    }

    /// Insert the plain-text part of a paste in place of the native paste
    pub fn handle_paste(&mut self, plain_text: &str) -> Vec<ContentEvent> {
        self.save_selection();
        let events = self.insert_at_caret(plain_text);
        self.surface.scroll_to_bottom();
        events
    }

    pub fn handle_key_down(&mut self, key: &str, shift: bool) -> KeyAction {
        if key != "Enter" {
            return KeyAction::default();
        }

        if shift {
            self.save_selection();
            // A single trailing newline does not render a new line
            let ends_in_newline = self
                .surface
                .inner_html()
                .is_some_and(|raw| raw.ends_with('\n'));
            let mut events = self.insert_at_caret("\n");
            if !ends_in_newline {
                events.extend(self.insert_at_caret("\n"));
            }
            self.surface.scroll_to_bottom();
            return KeyAction {
                prevent_default: true,
                events,
            };
        }

        KeyAction {
            prevent_default: true,
            events: self.submit(),
        }
    }

    /// Plain Enter or the send button
    pub fn submit(&mut self) -> Vec<ContentEvent> {
        let mut events = self.overflow_events();
        events.push(ContentEvent::EnterKey);
        events
    }

    pub fn handle_key_up(&mut self) {
        self.save_selection();
    }

    pub fn handle_mouse_up(&mut self) {
        self.save_selection();
    }

    /// Synchronize after the surface content changed
    pub fn handle_input(&mut self) -> Vec<ContentEvent> {
        let Some(raw) = self.surface.inner_html() else {
            return Vec::new();
        };
        let text = Self::normalize(&raw);
        let length = weighted_length(&text, self.weighting);
        self.length.actual_length = length;

        vec![
            ContentEvent::ContentChanged(raw),
            ContentEvent::ContentUpdated(text),
            ContentEvent::LengthChanged(length),
        ]
    }

    /// Recompute overflow against the current length
    pub fn check_overflow(&mut self) -> bool {
        self.overflowed = self.length.exceeds();
        self.overflowed
    }

    fn overflow_events(&mut self) -> Vec<ContentEvent> {
        let overflowed = self.check_overflow();
        if self.length.max_length.is_some() {
            vec![ContentEvent::Overflow(overflowed)]
        } else {
            Vec::new()
        }
    }

    fn normalize(raw: &str) -> String {
        let mut text = markup_to_text(raw);
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }

    /// Normalized plain text currently in the surface
    pub fn content_text(&self) -> String {
        self.surface
            .inner_html()
            .map(|raw| Self::normalize(&raw))
            .unwrap_or_default()
    }

    /// Replace the content with sanitized host markup
    ///
    /// The initial length always uses the default weighting.
    pub fn set_initial_content(&mut self, markup: &str) -> Vec<ContentEvent> {
        if !self.surface.is_mounted() {
            return Vec::new();
        }
        let clean = sanitize_surface_markup(markup);
        self.surface.set_inner_html(&clean);
        self.snapshot = None;

        let length = weighted_length(&Self::normalize(&clean), LengthWeighting::Default);
        self.length.actual_length = length;
        vec![ContentEvent::LengthChanged(length)]
    }

    pub fn clear(&mut self) -> Vec<ContentEvent> {
        if !self.surface.is_mounted() {
            return Vec::new();
        }
        self.surface.set_inner_html("");
        self.snapshot = None;
        self.length.actual_length = 0;
        vec![
            ContentEvent::ContentUpdated(String::new()),
            ContentEvent::LengthChanged(0),
        ]
    }
}
