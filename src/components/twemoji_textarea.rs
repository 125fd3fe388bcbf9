use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::components::icons::SendIcon;
use crate::components::twemoji_picker::TwemojiPicker;
use crate::config::TextareaConfig;
use crate::controllers::content_area::{ContentEvent, EditableContentArea};
use crate::services::emoji_catalog::{EmojiCatalog, SharedDataset};
use crate::utils::{generate_element_id, LengthWeighting};

#[cfg(target_family = "wasm")]
use crate::services::dom::{DomSelection as Selection, DomSurface as Surface, PasteListener};
#[cfg(not(target_family = "wasm"))]
use crate::services::surface::{MemorySelection as Selection, MemorySurface as Surface};

type ContentArea = EditableContentArea<Surface, Selection>;

#[cfg(target_family = "wasm")]
fn build_surface(id: &str) -> (Surface, Selection) {
    (Surface::new(id), Selection::new(id))
}

#[cfg(not(target_family = "wasm"))]
fn build_surface(_id: &str) -> (Surface, Selection) {
    let surface = Surface::new();
    let selection = surface.selection();
    (surface, selection)
}

#[derive(Props, Clone, PartialEq)]
pub struct TwemojiTextareaProps {
    #[props(default)]
    pub config: TextareaConfig,
    /// Shared with the embedded picker; the bundled table is used when absent
    #[props(default)]
    pub dataset: Option<SharedDataset>,
    #[props(default)]
    pub on_content_changed: EventHandler<String>,
    #[props(default)]
    pub on_content_updated: EventHandler<String>,
    #[props(default)]
    pub on_length_changed: EventHandler<usize>,
    #[props(default)]
    pub on_overflow: EventHandler<bool>,
    #[props(default)]
    pub on_enter_key: EventHandler<()>,
    #[props(default)]
    pub on_emoji_unicode_added: EventHandler<String>,
    #[props(default)]
    pub on_emoji_img_added: EventHandler<String>,
    #[props(default)]
    pub on_popup_open_changed: EventHandler<bool>,
    /// Changing this value empties the text area
    #[props(default)]
    pub clear_trigger: u64,
}

/// Content-editable text area with inline Twemoji images and an embedded
/// picker
///
/// Emits raw markup, normalized text and the weighted length after every
/// change. Enter submits, Shift+Enter inserts a line break.
#[component]
pub fn TwemojiTextarea(props: TwemojiTextareaProps) -> Element {
    let editable_id = use_hook(|| generate_element_id("twemoji-textarea"));
    let dataset = use_hook(|| props.dataset.clone().unwrap_or_else(SharedDataset::bundled));

    let area: Rc<RefCell<ContentArea>> = use_hook(|| {
        let picker = props.config.picker_config();
        let catalog = Rc::new(EmojiCatalog::new(&dataset, Some(picker.twemoji_options())));
        let (surface, selection) = build_surface(&editable_id);
        Rc::new(RefCell::new(EditableContentArea::new(
            surface,
            selection,
            catalog,
            props.config.maxlength,
            LengthWeighting::from_weight_changed(picker.emoji_text_weight_changed),
        )))
    });

    let length = use_signal(|| 0usize);

    let on_content_changed = props.on_content_changed;
    let on_content_updated = props.on_content_updated;
    let on_length_changed = props.on_length_changed;
    let on_overflow = props.on_overflow;
    let on_enter_key = props.on_enter_key;
    let dispatch = move |events: Vec<ContentEvent>| {
        for event in events {
            match event {
                ContentEvent::ContentChanged(raw) => on_content_changed.call(raw),
                ContentEvent::ContentUpdated(text) => on_content_updated.call(text),
                ContentEvent::LengthChanged(value) => {
                    let mut length = length;
                    length.set(value);
                    on_length_changed.call(value);
                }
                ContentEvent::Overflow(overflowed) => on_overflow.call(overflowed),
                ContentEvent::EnterKey => on_enter_key.call(()),
            }
        }
    };

    // Keep the area in step with host options that may change
    let sync = area.clone();
    let maxlength = props.config.maxlength;
    let weight_changed = props.config.picker.emoji_text_weight_changed;
    use_effect(use_reactive((&maxlength, &weight_changed), move |(maxlength, weight_changed)| {
        if let Ok(mut area) = sync.try_borrow_mut() {
            area.set_maxlength(maxlength);
            area.set_weighting(LengthWeighting::from_weight_changed(weight_changed));
        }
    }));

    let initial = area.clone();
    let initial_content = props.config.initial_content.clone();
    use_effect(use_reactive(&initial_content, move |content| {
        if content.is_empty() {
            return;
        }
        let events = match initial.try_borrow_mut() {
            Ok(mut area) => area.set_initial_content(&content),
            Err(_) => return,
        };
        dispatch(events);
    }));

    let clearing = area.clone();
    use_effect(use_reactive(&props.clear_trigger, move |trigger| {
        if trigger == 0 {
            return;
        }
        let events = match clearing.try_borrow_mut() {
            Ok(mut area) => area.clear(),
            Err(_) => return,
        };
        log::debug!("Text area cleared ({})", trigger);
        dispatch(events);
    }));

    // Native paste so only the plain-text flavour gets in
    #[cfg(target_family = "wasm")]
    {
        let mut paste_listener = use_signal(|| None::<PasteListener>);
        let paste_area = area.clone();
        let paste_id = editable_id.clone();
        use_effect(move || {
            let target = paste_area.clone();
            let listener = PasteListener::attach(&paste_id, move |text| {
                let events = match target.try_borrow_mut() {
                    Ok(mut area) => area.handle_paste(&text),
                    Err(_) => return,
                };
                dispatch(events);
            });
            paste_listener.set(listener);
        });

        use_drop(move || {
            paste_listener.write().take();
        });
    }

    let on_input = area.clone();
    let on_key_down = area.clone();
    let on_key_up = area.clone();
    let on_mouse_up = area.clone();
    let on_send = area.clone();
    let on_picked = area.clone();

    let config = &props.config;
    let padding = if config.maxlength.is_some() { "15px" } else { "0px" };
    let over_limit = config.maxlength.map_or(false, |max| length() > max);
    let editable = !config.textarea_disabled;
    let outer_id = config.id_textarea.clone();
    let color = config.component_color.clone();
    let placeholder = config.placeholder.clone();

    rsx! {
        div {
            id: "{outer_id}",
            class: "twemoji-textarea-outer relative flex items-start gap-2 rounded-lg p-2",
            style: "padding-bottom: {padding}; background-color: {color};",

            TwemojiPicker {
                config: config.picker_config(),
                dataset: dataset.clone(),
                on_add_text_blur: move |text: String| {
                    let events = match on_picked.try_borrow_mut() {
                        Ok(mut area) => area.insert_and_blur(&text),
                        Err(_) => return,
                    };
                    dispatch(events);
                },
                on_emoji_unicode_added: move |unicode| props.on_emoji_unicode_added.call(unicode),
                on_emoji_img_added: move |img| props.on_emoji_img_added.call(img),
                on_popup_open_changed: move |open| props.on_popup_open_changed.call(open),
            }

            div {
                id: "{editable_id}",
                class: "twemoji-textarea flex-1 min-h-[2.5rem] max-h-48 overflow-y-auto outline-none whitespace-pre-wrap break-words",
                contenteditable: "{editable}",
                "data-placeholder": "{placeholder}",
                oninput: move |_| {
                    let events = match on_input.try_borrow_mut() {
                        Ok(mut area) => area.handle_input(),
                        Err(_) => return,
                    };
                    dispatch(events);
                },
                onkeydown: move |evt| {
                    let key = evt.key().to_string();
                    let shift = evt.modifiers().shift();
                    let action = match on_key_down.try_borrow_mut() {
                        Ok(mut area) => area.handle_key_down(&key, shift),
                        Err(_) => return,
                    };
                    if action.prevent_default {
                        evt.prevent_default();
                    }
                    dispatch(action.events);
                },
                onkeyup: move |_| {
                    if let Ok(mut area) = on_key_up.try_borrow_mut() {
                        area.handle_key_up();
                    }
                },
                onmouseup: move |_| {
                    if let Ok(mut area) = on_mouse_up.try_borrow_mut() {
                        area.handle_mouse_up();
                    }
                },
            }

            if config.enable_send_btn {
                button {
                    id: "send-btn",
                    r#type: "button",
                    class: "p-2 text-blue-500 hover:bg-blue-50 dark:hover:bg-gray-700 rounded-full transition",
                    onclick: move |_| {
                        let events = match on_send.try_borrow_mut() {
                            Ok(mut area) => area.submit(),
                            Err(_) => return,
                        };
                        dispatch(events);
                    },
                    SendIcon {}
                }
            }

            if let Some(max) = config.maxlength {
                div {
                    id: "length-indicator",
                    class: "absolute bottom-1 right-2 text-xs",
                    span {
                        class: if over_limit { "text-red-500 font-semibold" } else { "text-gray-700 dark:text-gray-300" },
                        "{length}"
                    }
                    "/"
                    span { "{max}" }
                }
            }
        }
    }
}
