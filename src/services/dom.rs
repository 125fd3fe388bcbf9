//! Browser implementations of the surface, selection and layout traits
//!
//! Every type holds an element id and looks the element up on each call,
//! so it stays valid across re-renders and is a no-op while unmounted.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Range, Selection};

use super::positioning::{ComputedPosition, LayoutSource, Rect, Side};
use super::surface::{EditableSurface, SelectionService};
use crate::services::positioning::ARROW_SIZE;

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn element(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

fn html_element(id: &str) -> Option<HtmlElement> {
    element(id)?.dyn_into::<HtmlElement>().ok()
}

fn selection() -> Option<Selection> {
    web_sys::window()?.get_selection().ok().flatten()
}

/// Width of an element in CSS pixels
pub fn element_width(id: &str) -> Option<f64> {
    element(id).map(|el| el.get_bounding_client_rect().width())
}

/// First range of the document selection if it lies inside `root`
fn range_inside(root: &Element) -> Option<Range> {
    let selection = selection()?;
    if selection.range_count() == 0 {
        return None;
    }
    let range = selection.get_range_at(0).ok()?;
    let container = range.start_container().ok()?;
    root.contains(Some(&container)).then_some(range)
}

fn select(range: &Range) {
    if let Some(selection) = selection() {
        selection.remove_all_ranges().ok();
        selection.add_range(range).ok();
    }
}

fn caret_at_end(root: &Element) -> Option<Range> {
    let range = document()?.create_range().ok()?;
    range.select_node_contents(root).ok()?;
    range.collapse_with_to_start(false);
    Some(range)
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomSurface {
    id: String,
}

impl DomSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl EditableSurface for DomSurface {
    fn is_mounted(&self) -> bool {
        element(&self.id).map_or(false, |el| el.is_connected())
    }

    fn inner_html(&self) -> Option<String> {
        element(&self.id).map(|el| el.inner_html())
    }

    fn set_inner_html(&self, html: &str) {
        if let Some(el) = element(&self.id) {
            el.set_inner_html(html);
        }
    }

    fn has_children(&self) -> bool {
        element(&self.id).map_or(false, |el| el.has_child_nodes())
    }

    fn prepare_empty(&self) {
        let (Some(doc), Some(el)) = (document(), element(&self.id)) else {
            return;
        };
        let text = doc.create_text_node("");
        if el.append_child(&text).is_err() {
            return;
        }
        if let Ok(range) = doc.create_range() {
            if range.set_start(&text, 0).is_ok() {
                range.collapse_with_to_start(true);
                select(&range);
            }
        }
    }

    fn focus(&self) {
        if let Some(el) = html_element(&self.id) {
            el.focus().ok();
        }
    }

    fn blur(&self) {
        if let Some(el) = html_element(&self.id) {
            el.blur().ok();
        }
    }

    fn insert_html(&self, html: &str) {
        let Some(el) = element(&self.id) else {
            return;
        };
        let Some(range) = range_inside(&el).or_else(|| caret_at_end(&el)) else {
            return;
        };

        let fragment = match range.create_contextual_fragment(html) {
            Ok(fragment) => fragment,
            Err(e) => {
                log::warn!("Failed to parse inserted markup: {:?}", e);
                return;
            }
        };
        let last = fragment.last_child();

        if range.delete_contents().is_err() || range.insert_node(&fragment).is_err() {
            log::warn!("Failed to insert markup into #{}", self.id);
            return;
        }
        if let Some(last) = last {
            range.set_start_after(&last).ok();
        }
        range.collapse_with_to_start(true);
        select(&range);
    }

    fn scroll_to_bottom(&self) {
        if let Some(el) = element(&self.id) {
            el.set_scroll_top(el.scroll_height());
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomSelection {
    surface_id: String,
}

impl DomSelection {
    pub fn new(surface_id: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
        }
    }
}

impl SelectionService for DomSelection {
    type Snapshot = Range;

    fn capture(&self) -> Option<Range> {
        let el = element(&self.surface_id)?;
        range_inside(&el).map(|range| range.clone_range())
    }

    fn restore(&self, snapshot: &Range) -> bool {
        let Some(el) = element(&self.surface_id) else {
            return false;
        };
        let valid = snapshot
            .start_container()
            .map_or(false, |node| node.is_connected() && el.contains(Some(&node)));
        if valid {
            select(snapshot);
        }
        valid
    }

    fn place_at_end(&self) {
        if let Some(range) = element(&self.surface_id).and_then(|el| caret_at_end(&el)) {
            select(&range);
        }
    }
}

/// Reads bounding rects and writes `position: fixed` translations
#[derive(Clone, Copy, Debug, Default)]
pub struct DomLayout;

impl DomLayout {
    fn arrow_css(position: &ComputedPosition) -> String {
        let Some(offset) = position.arrow else {
            return "display: none;".to_string();
        };
        let half = ARROW_SIZE / 2.0;
        let edge = match position.placement.side() {
            Some(Side::Top) | None => format!("bottom: -{}px; left: {}px;", half, offset),
            Some(Side::Bottom) => format!("top: -{}px; left: {}px;", half, offset),
            Some(Side::Left) => format!("right: -{}px; top: {}px;", half, offset),
            Some(Side::Right) => format!("left: -{}px; top: {}px;", half, offset),
        };
        format!(
            "position: absolute; width: {size}px; height: {size}px; transform: rotate(45deg); background: inherit; {edge}",
            size = ARROW_SIZE,
            edge = edge
        )
    }
}

impl LayoutSource for DomLayout {
    fn rect_of(&self, id: &str) -> Option<Rect> {
        let rect = element(id)?.get_bounding_client_rect();
        Some(Rect::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }

    fn viewport(&self) -> Rect {
        let window = web_sys::window();
        let dimension = |value: Option<wasm_bindgen::JsValue>| value.and_then(|v| v.as_f64()).unwrap_or(0.0);
        let width = dimension(window.as_ref().and_then(|w| w.inner_width().ok()));
        let height = dimension(window.as_ref().and_then(|w| w.inner_height().ok()));
        Rect::new(0.0, 0.0, width, height)
    }

    fn apply(&self, floating_id: &str, position: &ComputedPosition) {
        let Some(el) = html_element(floating_id) else {
            return;
        };

        let style = el.style();
        style
            .set_property(
                "transform",
                &format!("translate({}px, {}px)", position.x.round(), position.y.round()),
            )
            .ok();
        el.set_attribute("data-popper-placement", position.placement.as_str()).ok();

        if let Some(arrow) = html_element(&format!("{}-arrow", floating_id)) {
            arrow.style().set_css_text(&Self::arrow_css(position));
        }
    }
}

/// Native `paste` listener on a content-editable element
///
/// The default paste is cancelled and only the `text/plain` flavour is
/// handed on. Removed on drop.
pub struct PasteListener {
    element: Element,
    callback: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::ClipboardEvent)>,
}

impl PasteListener {
    pub fn attach<F>(id: &str, mut on_paste: F) -> Option<Self>
    where
        F: FnMut(String) + 'static,
    {
        let element = element(id)?;

        let callback = wasm_bindgen::closure::Closure::wrap(Box::new(move |event: web_sys::ClipboardEvent| {
            event.prevent_default();
            let text = event
                .clipboard_data()
                .and_then(|data| data.get_data("text/plain").ok())
                .unwrap_or_default();
            on_paste(text);
        }) as Box<dyn FnMut(web_sys::ClipboardEvent)>);

        if let Err(e) = element.add_event_listener_with_callback("paste", callback.as_ref().unchecked_ref()) {
            log::warn!("Failed to register paste listener on #{}: {:?}", id, e);
            return None;
        }

        Some(Self { element, callback })
    }
}

impl Drop for PasteListener {
    fn drop(&mut self) {
        self.element
            .remove_event_listener_with_callback("paste", self.callback.as_ref().unchecked_ref())
            .ok();
    }
}
