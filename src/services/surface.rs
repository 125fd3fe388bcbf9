//! Editable surface and selection access
//!
//! The content area talks to its content-editable element only through
//! these traits. The browser implementations live in `services::dom`; the
//! in-memory ones below back the tests and non-browser hosts.

use std::cell::RefCell;
use std::rc::Rc;

pub trait EditableSurface {
    /// Whether the element is currently in the document
    fn is_mounted(&self) -> bool;
    fn inner_html(&self) -> Option<String>;
    fn set_inner_html(&self, html: &str);
    fn has_children(&self) -> bool;
    /// Give an empty surface a text node for the caret to sit in
    fn prepare_empty(&self);
    fn focus(&self);
    fn blur(&self);
    /// Insert markup at the current caret, leaving the caret after it
    fn insert_html(&self, html: &str);
    fn scroll_to_bottom(&self);
}

pub trait SelectionService {
    type Snapshot: Clone;

    /// Current caret inside the surface, if there is one
    fn capture(&self) -> Option<Self::Snapshot>;
    /// Put the caret back; false when the snapshot no longer applies
    fn restore(&self, snapshot: &Self::Snapshot) -> bool;
    fn place_at_end(&self);
}

#[derive(Debug, Default)]
struct MemoryDoc {
    html: String,
    caret: usize,
    focused: bool,
    mounted: bool,
    has_text_node: bool,
    generation: u64,
    scrolls: usize,
}

/// In-memory editable surface
///
/// Markup is kept as a string with the caret as a byte offset. Replacing
/// the whole content starts a new generation, which invalidates every
/// snapshot taken before.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    doc: Rc<RefCell<MemoryDoc>>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            doc: Rc::new(RefCell::new(MemoryDoc {
                mounted: true,
                ..MemoryDoc::default()
            })),
        }
    }

    /// Selection service bound to this surface
    pub fn selection(&self) -> MemorySelection {
        MemorySelection {
            doc: Rc::clone(&self.doc),
        }
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.doc.borrow_mut().mounted = mounted;
    }

    pub fn is_focused(&self) -> bool {
        self.doc.borrow().focused
    }

    pub fn caret(&self) -> usize {
        self.doc.borrow().caret
    }

    /// Move the caret as a user click would, snapping to a char boundary
    pub fn set_caret(&self, offset: usize) {
        let mut doc = self.doc.borrow_mut();
        let mut offset = offset.min(doc.html.len());
        while !doc.html.is_char_boundary(offset) {
            offset -= 1;
        }
        doc.caret = offset;
    }

    /// How many times the surface was scrolled to the bottom
    pub fn scroll_count(&self) -> usize {
        self.doc.borrow().scrolls
    }

    /// Simulate the user typing at the caret
    pub fn type_text(&self, text: &str) {
        let mut doc = self.doc.borrow_mut();
        let caret = doc.caret;
        doc.html.insert_str(caret, text);
        doc.caret = caret + text.len();
    }
}

impl EditableSurface for MemorySurface {
    fn is_mounted(&self) -> bool {
        self.doc.borrow().mounted
    }

    fn inner_html(&self) -> Option<String> {
        let doc = self.doc.borrow();
        doc.mounted.then(|| doc.html.clone())
    }

    fn set_inner_html(&self, html: &str) {
        let mut doc = self.doc.borrow_mut();
        doc.html = html.to_string();
        doc.caret = doc.html.len();
        doc.has_text_node = false;
        doc.generation += 1;
    }

    fn has_children(&self) -> bool {
        let doc = self.doc.borrow();
        doc.has_text_node || !doc.html.is_empty()
    }

    fn prepare_empty(&self) {
        let mut doc = self.doc.borrow_mut();
        doc.has_text_node = true;
        doc.caret = 0;
    }

    fn focus(&self) {
        let mut doc = self.doc.borrow_mut();
        if doc.mounted {
            doc.focused = true;
        }
    }

    fn blur(&self) {
        self.doc.borrow_mut().focused = false;
    }

    fn insert_html(&self, html: &str) {
        let mut doc = self.doc.borrow_mut();
        if !doc.mounted || !doc.focused {
            return;
        }
        let caret = doc.caret.min(doc.html.len());
        doc.html.insert_str(caret, html);
        doc.caret = caret + html.len();
    }

    fn scroll_to_bottom(&self) {
        self.doc.borrow_mut().scrolls += 1;
    }
}

/// Selection over a [`MemorySurface`]; snapshots are `(generation, offset)`
#[derive(Clone, Debug)]
pub struct MemorySelection {
    doc: Rc<RefCell<MemoryDoc>>,
}

impl SelectionService for MemorySelection {
    type Snapshot = (u64, usize);

    fn capture(&self) -> Option<Self::Snapshot> {
        let doc = self.doc.borrow();
        doc.mounted.then_some((doc.generation, doc.caret))
    }

    fn restore(&self, snapshot: &Self::Snapshot) -> bool {
        let mut doc = self.doc.borrow_mut();
        let (generation, offset) = *snapshot;
        if !doc.mounted || generation != doc.generation || offset > doc.html.len() {
            return false;
        }
        doc.caret = offset;
        true
    }

    fn place_at_end(&self) {
        let mut doc = self.doc.borrow_mut();
        doc.caret = doc.html.len();
    }
}
