use dioxus::prelude::*;
use std::rc::Rc;

use crate::components::icons::SearchIcon;
use crate::components::popup_emoji::PopupEmoji;
use crate::config::PickerConfig;
use crate::controllers::picker::{EmojiPicker, PickerEvent, PickerTab, PickerView};
use crate::services::emoji_catalog::{Emoji, EmojiCatalog, SharedDataset};
use crate::stores::storage::backend_for;
use crate::utils::{generate_element_id, BrowserScheduler};

#[derive(Props, Clone, PartialEq)]
pub struct TwemojiPickerProps {
    #[props(default)]
    pub config: PickerConfig,
    /// Shared catalog data; the bundled table is used when absent
    #[props(default)]
    pub dataset: Option<SharedDataset>,
    #[props(default)]
    pub on_add_text_blur: EventHandler<String>,
    #[props(default)]
    pub on_emoji_unicode_added: EventHandler<String>,
    #[props(default)]
    pub on_emoji_img_added: EventHandler<String>,
    #[props(default)]
    pub on_popup_open_changed: EventHandler<bool>,
}

fn build_picker(config: &PickerConfig, dataset: Option<&SharedDataset>) -> EmojiPicker {
    let dataset = dataset.cloned().unwrap_or_else(SharedDataset::bundled);
    let catalog = Rc::new(EmojiCatalog::new(&dataset, Some(config.twemoji_options())));

    log::info!(
        "Twemoji picker ready: {} groups, recents {}, search {}",
        catalog.groups_of().len(),
        if config.recent_emojis_feat { "on" } else { "off" },
        if config.search_emojis_feat { "on" } else { "off" },
    );

    EmojiPicker::new(
        config.clone(),
        catalog,
        backend_for(config.recent_emojis_storage),
        Rc::new(BrowserScheduler),
    )
}

#[cfg(target_family = "wasm")]
fn measure_width(id: &str) -> Option<f64> {
    crate::services::dom::element_width(id)
}

#[cfg(not(target_family = "wasm"))]
fn measure_width(_id: &str) -> Option<f64> {
    None
}

const TAB_CLASS: &str = "px-2 py-1 hover:bg-gray-100 dark:hover:bg-gray-700 rounded text-xs whitespace-nowrap";
const ACTIVE_TAB_CLASS: &str =
    "px-2 py-1 bg-blue-100 dark:bg-blue-900 text-blue-700 dark:text-blue-300 rounded text-xs font-medium whitespace-nowrap";

/// Twemoji picker: trigger button plus a floating panel with group tabs,
/// optional search and recents, and a long-press skin-tone popup
#[component]
pub fn TwemojiPicker(props: TwemojiPickerProps) -> Element {
    let picker = use_hook(|| build_picker(&props.config, props.dataset.as_ref()));
    let grid_id = use_hook(|| generate_element_id("twemoji-grid"));
    let skins_panel_id = use_hook(|| generate_element_id("twemoji-skins"));

    // Bumped whenever the controller changes state on its own timers
    let mut revision = use_signal(|| 0u64);
    let listener = picker.clone();
    use_hook(move || {
        listener.on_change(move || {
            let mut revision = revision;
            revision += 1;
        });
    });

    let teardown = picker.clone();
    use_drop(move || teardown.teardown());

    // Host options may change after mount
    let sync = picker.clone();
    use_effect(use_reactive(&props.config, move |config| {
        if sync.set_config(config) {
            revision += 1;
        }
    }));

    let _ = revision.read();

    let on_add_text_blur = props.on_add_text_blur;
    let on_emoji_unicode_added = props.on_emoji_unicode_added;
    let on_emoji_img_added = props.on_emoji_img_added;
    let dispatch = move |events: Vec<PickerEvent>| {
        for event in events {
            match event {
                PickerEvent::AddTextBlur(text) => on_add_text_blur.call(text),
                PickerEvent::EmojiUnicodeAdded(unicode) => on_emoji_unicode_added.call(unicode),
                PickerEvent::EmojiImgAdded(img) => on_emoji_img_added.call(img),
            }
        }
    };

    let config = &props.config;
    let width = picker.calculated_width(measure_width);
    let height = config.height;
    let active = picker.active_tab();
    let tabs: Vec<(PickerTab, String)> = picker
        .tabs()
        .into_iter()
        .map(|tab| (tab, picker.tab_label(tab)))
        .collect();
    let view = picker.view();
    let search_enabled = config.search_emojis_feat;
    let placeholder = config.search_emoji_placeholder.clone();
    let search_term = picker.search_term();
    let trigger_markup = picker.trigger_markup();
    let skins_for = picker.skins_for();
    // The skins popup follows whichever cell was last pressed
    let skins_anchor = picker
        .skins_popup()
        .position()
        .map(|handle| handle.anchor_id())
        .unwrap_or_else(|| grid_id.clone());

    let on_trigger_enter = picker.clone();
    let on_search = picker.clone();

    rsx! {
        div {
            class: "twemoji-picker relative inline-block",

            PopupEmoji {
                controller: picker.popup().clone(),
                positioning: config.positioning_config(),
                inside_ids: vec![skins_panel_id.clone()],
                on_visibility_changed: move |open| props.on_popup_open_changed.call(open),
                trigger: rsx! {
                    button {
                        r#type: "button",
                        class: "twemoji-picker-trigger p-1 hover:bg-gray-100 dark:hover:bg-gray-700 rounded transition",
                        disabled: config.disabled,
                        onmouseenter: move |_| {
                            on_trigger_enter.randomize_trigger();
                            revision += 1;
                        },
                        span { class: "w-6 h-6 inline-block", dangerous_inner_html: "{trigger_markup}" }
                    }
                },

                div {
                    class: "flex flex-col",
                    style: "width: {width}px;",

                    // Group tabs, recents first when there are any
                    div {
                        class: "flex gap-1 p-2 border-b border-gray-200 dark:border-gray-700 overflow-x-auto",
                        for (tab, label) in tabs {
                            {
                                let on_tab = picker.clone();
                                let key = match tab {
                                    PickerTab::Recent => "recent".to_string(),
                                    PickerTab::Group(group) => format!("group-{group}"),
                                };
                                rsx! {
                                    button {
                                        key: "{key}",
                                        r#type: "button",
                                        class: if active == Some(tab) { ACTIVE_TAB_CLASS } else { TAB_CLASS },
                                        onclick: move |_| {
                                            on_tab.select_tab(tab);
                                            revision += 1;
                                        },
                                        span { class: "inline-block w-5 h-5", dangerous_inner_html: "{label}" }
                                    }
                                }
                            }
                        }
                    }

                    if search_enabled {
                        div {
                            class: "flex items-center gap-2 px-3 py-2 border-b border-gray-200 dark:border-gray-700",
                            SearchIcon { class: "w-4 h-4 text-gray-400".to_string() }
                            input {
                                r#type: "text",
                                class: "flex-1 bg-transparent text-sm outline-none",
                                placeholder: "{placeholder}",
                                value: "{search_term}",
                                oninput: move |evt| {
                                    on_search.set_search_term(&evt.value());
                                    revision += 1;
                                },
                            }
                        }
                    }

                    div {
                        id: "{grid_id}",
                        class: "p-2 overflow-y-auto",
                        style: "height: {height}px;",

                        match view {
                            PickerView::Loading(label) => rsx! {
                                div { class: "text-center text-sm text-gray-500 py-4", "{label}" }
                            },
                            PickerView::NotFound(label) => rsx! {
                                div { class: "text-center text-sm text-gray-500 py-4", "{label}" }
                            },
                            PickerView::Grid(list) => rsx! {
                                div {
                                    class: "grid grid-cols-7 gap-1",
                                    for (index, emoji) in list.into_iter().enumerate() {
                                        EmojiCell {
                                            key: "{emoji.unicode}",
                                            id: format!("{grid_id}-{index}"),
                                            emoji: emoji.clone(),
                                            picker: picker.clone(),
                                            on_select: move |events| {
                                                dispatch(events);
                                                revision += 1;
                                            },
                                        }
                                    }
                                }
                            },
                        }
                    }
                }
            }

            // Skin tones for the emoji being held
            PopupEmoji {
                controller: picker.skins_popup().clone(),
                positioning: picker.skins_positioning(),
                anchor_id: skins_anchor,
                panel_id: skins_panel_id.clone(),
                div {
                    class: "flex gap-1 p-1",
                    if let Some(base) = skins_for {
                        for skin in base.skins {
                            {
                                let on_skin = picker.clone();
                                let chosen = skin.clone();
                                rsx! {
                                    button {
                                        key: "{skin.unicode}",
                                        r#type: "button",
                                        class: "w-7 h-7 p-0.5 hover:bg-gray-100 dark:hover:bg-gray-700 rounded",
                                        onclick: move |_| {
                                            dispatch(on_skin.select_skin(&chosen));
                                            revision += 1;
                                        },
                                        span { dangerous_inner_html: "{skin.img}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Props, Clone)]
struct EmojiCellProps {
    id: String,
    emoji: Emoji,
    picker: EmojiPicker,
    on_select: EventHandler<Vec<PickerEvent>>,
}

impl PartialEq for EmojiCellProps {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.emoji == other.emoji && self.picker.popup() == other.picker.popup()
    }
}

/// One grid entry; click selects, holding opens the skin tones
#[component]
fn EmojiCell(props: EmojiCellProps) -> Element {
    let id = props.id.clone();
    let img = props.emoji.img.clone();
    let title = props.emoji.tags.first().cloned().unwrap_or_default();

    let on_click = props.picker.clone();
    let clicked = props.emoji.clone();
    let on_press = props.picker.clone();
    let pressed = props.emoji.clone();
    let anchor = props.id.clone();
    let on_release = props.picker.clone();
    let on_leave = props.picker.clone();

    rsx! {
        span {
            id: "{id}",
            class: "twemoji-cell flex items-center justify-center w-8 h-8 p-1 rounded cursor-pointer hover:bg-gray-100 dark:hover:bg-gray-700",
            title: "{title}",
            onclick: move |_| {
                props.on_select.call(on_click.select(&clicked));
            },
            onmousedown: move |_| {
                on_press.skins_popup().retarget(&anchor);
                on_press.press_start(&pressed);
            },
            onmouseup: move |_| on_release.press_end(),
            onmouseleave: move |_| on_leave.press_end(),
            dangerous_inner_html: "{img}",
        }
    }
}
