#![allow(non_snake_case)]

use anyhow::Context;
use dioxus::prelude::*;

use twemoji_widgets::{PickerConfig, SharedDataset, TextareaConfig, TwemojiPicker, TwemojiTextarea};

// Sandbox options, same shape a host page would pass in
const PICKER_OPTIONS: &str = r#"{
    "placement": "bottom-start",
    "recent_emojis_feat": true,
    "recent_emojis_storage": "local",
    "search_emojis_feat": true,
    "skins_selection": true
}"#;

const TEXTAREA_OPTIONS: &str = r#"{
    "enable_send_btn": true,
    "placeholder": "Write something...",
    "maxlength": 280,
    "picker": {
        "placement": "top-start",
        "recent_emojis_feat": true,
        "recent_emojis_storage": "local",
        "skins_selection": true
    }
}"#;

fn load_options() -> anyhow::Result<(PickerConfig, TextareaConfig)> {
    let picker = PickerConfig::from_json(PICKER_OPTIONS).context("invalid picker options")?;
    let textarea = TextareaConfig::from_json(TEXTAREA_OPTIONS).context("invalid text area options")?;
    Ok((picker, textarea))
}

fn main() {
    // Initialize panic hook for better error messages in browser console
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    }

    log::info!("Starting twemoji widgets sandbox");

    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let options = use_hook(|| match load_options() {
        Ok(options) => options,
        Err(e) => {
            log::error!("{:#}, falling back to defaults", e);
            (PickerConfig::default(), TextareaConfig::default())
        }
    });
    let dataset = use_hook(SharedDataset::bundled);

    let mut picked = use_signal(String::new);
    let mut text = use_signal(String::new);
    let mut sent = use_signal(Vec::<String>::new);
    let mut clear_trigger = use_signal(|| 0u64);
    let mut over_limit = use_signal(|| false);

    let (picker_config, textarea_config) = options;

    rsx! {
        div {
            class: "max-w-xl mx-auto p-6 space-y-8",

            section {
                class: "space-y-2",
                h2 { class: "text-lg font-semibold", "Picker" }
                div {
                    class: "flex items-center gap-3",
                    TwemojiPicker {
                        config: picker_config,
                        dataset: dataset.clone(),
                        on_emoji_unicode_added: move |unicode: String| {
                            log::info!("Picked {}", unicode);
                            picked.write().push_str(&unicode);
                        },
                        on_popup_open_changed: move |open| log::debug!("Picker open: {}", open),
                    }
                    span { class: "text-2xl", "{picked}" }
                }
            }

            section {
                class: "space-y-2",
                h2 { class: "text-lg font-semibold", "Text area" }
                TwemojiTextarea {
                    config: textarea_config,
                    dataset: dataset.clone(),
                    clear_trigger: clear_trigger(),
                    on_content_updated: move |value: String| text.set(value),
                    on_length_changed: move |length| log::debug!("Length {}", length),
                    on_overflow: move |overflowed| over_limit.set(overflowed),
                    on_enter_key: move |_| {
                        let message = text.read().clone();
                        if message.trim().is_empty() {
                            return;
                        }
                        if over_limit() {
                            log::warn!("Message is over the limit, not sending");
                            return;
                        }
                        log::info!("Sending {:?}", message);
                        sent.write().push(message);
                        clear_trigger += 1;
                    },
                }

                ul {
                    class: "text-sm text-gray-600 dark:text-gray-300 space-y-1",
                    for (index, message) in sent.read().iter().enumerate() {
                        li { key: "{index}", class: "whitespace-pre-wrap", "{message}" }
                    }
                }
            }
        }
    }
}
