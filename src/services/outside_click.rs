//! Click-away detection
//!
//! [`OutsideInteractionDetector`] decides whether a pointer-down happened
//! outside a set of watched elements. In the browser,
//! [`OutsideClickListener`] feeds it from a document-level `pointerdown`
//! listener.

use std::rc::Rc;

#[derive(Clone)]
pub struct OutsideInteractionDetector {
    watched: Vec<String>,
    on_outside: Rc<dyn Fn()>,
}

impl OutsideInteractionDetector {
    /// Watch the subtrees rooted at `watched` element ids
    pub fn new<F>(watched: Vec<String>, on_outside: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            watched,
            on_outside: Rc::new(on_outside),
        }
    }

    /// Report one pointer-down; `contains(id)` tells whether the event
    /// target lies inside the element with that id.
    ///
    /// Returns true when the outside callback fired.
    pub fn handle_pointer_down<F>(&self, contains: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        if self.watched.iter().any(|id| contains(id)) {
            return false;
        }
        (self.on_outside)();
        true
    }
}

#[cfg(target_family = "wasm")]
pub use listener::OutsideClickListener;

/// Outside the browser there is no document to listen on
#[cfg(not(target_family = "wasm"))]
pub struct OutsideClickListener;

#[cfg(not(target_family = "wasm"))]
impl OutsideClickListener {
    pub fn attach(_detector: OutsideInteractionDetector) -> Option<Self> {
        None
    }
}

#[cfg(target_family = "wasm")]
mod listener {
    use super::OutsideInteractionDetector;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    /// Document `pointerdown` listener, removed on drop
    pub struct OutsideClickListener {
        document: web_sys::Document,
        callback: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl OutsideClickListener {
        pub fn attach(detector: OutsideInteractionDetector) -> Option<Self> {
            let document = web_sys::window()?.document()?;
            let lookup = document.clone();

            let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let target = event
                    .target()
                    .and_then(|target| target.dyn_into::<web_sys::Node>().ok());

                detector.handle_pointer_down(|id| match (&target, lookup.get_element_by_id(id)) {
                    (Some(target), Some(element)) => element.contains(Some(target)),
                    _ => false,
                });
            }) as Box<dyn FnMut(web_sys::Event)>);

            if let Err(e) =
                document.add_event_listener_with_callback("pointerdown", callback.as_ref().unchecked_ref())
            {
                log::warn!("Failed to register click-away listener: {:?}", e);
                return None;
            }

            Some(Self { document, callback })
        }
    }

    impl Drop for OutsideClickListener {
        fn drop(&mut self) {
            self.document
                .remove_event_listener_with_callback("pointerdown", self.callback.as_ref().unchecked_ref())
                .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_reports_outside_once() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let detector = OutsideInteractionDetector::new(
            vec!["panel".to_string(), "trigger".to_string()],
            move || counter.set(counter.get() + 1),
        );

        assert!(detector.handle_pointer_down(|_| false));
        assert_eq!(count.get(), 1);

        assert!(!detector.handle_pointer_down(|id| id == "trigger"));
        assert!(!detector.handle_pointer_down(|id| id == "panel"));
        assert_eq!(count.get(), 1);
    }
}
