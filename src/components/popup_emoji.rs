use dioxus::prelude::*;

use crate::controllers::popup::PopupController;
use crate::services::outside_click::{OutsideClickListener, OutsideInteractionDetector};
use crate::services::positioning::PositioningConfig;
use crate::utils::generate_element_id;

#[cfg(target_family = "wasm")]
fn bind_position(controller: &PopupController, anchor_id: &str, panel_id: &str, positioning: PositioningConfig) {
    use crate::services::dom::DomLayout;
    use crate::services::positioning::PositioningAdapter;
    use std::rc::Rc;

    controller.attach(PositioningAdapter::create(anchor_id, panel_id, positioning, Rc::new(DomLayout)));
}

#[cfg(not(target_family = "wasm"))]
fn bind_position(_controller: &PopupController, anchor_id: &str, _panel_id: &str, _positioning: PositioningConfig) {
    log::debug!("No layout outside the browser, popup for #{} stays unmounted", anchor_id);
}

#[derive(Props, Clone, PartialEq)]
pub struct PopupEmojiProps {
    pub controller: PopupController,
    pub positioning: PositioningConfig,
    /// Element to position against instead of the rendered trigger
    #[props(default)]
    pub anchor_id: Option<String>,
    /// Fixed id for the panel, generated when absent
    #[props(default)]
    pub panel_id: Option<String>,
    /// Further elements whose clicks do not count as outside
    #[props(default)]
    pub inside_ids: Vec<String>,
    #[props(default = VNode::empty())]
    pub trigger: Element,
    #[props(default)]
    pub panel_class: String,
    #[props(default)]
    pub panel_style: String,
    #[props(default)]
    pub on_visibility_changed: EventHandler<bool>,
    pub children: Element,
}

/// Floating panel driven by a [`PopupController`]
///
/// The panel stays mounted while closed so it can be measured and
/// positioned the moment it opens.
#[component]
pub fn PopupEmoji(props: PopupEmojiProps) -> Element {
    let trigger_id = use_hook(|| generate_element_id("twemoji-trigger"));
    let panel_id = use_hook(|| {
        props
            .panel_id
            .clone()
            .unwrap_or_else(|| generate_element_id("twemoji-popup"))
    });
    let anchor_id = props.anchor_id.clone().unwrap_or_else(|| trigger_id.clone());
    let is_open = use_signal(|| props.controller.is_open());

    // Mirror transitions into the render state and out to the host
    let controller = props.controller.clone();
    let on_visibility_changed = props.on_visibility_changed;
    use_hook(move || {
        controller.on_visibility_changed(move |open| {
            let mut is_open = is_open;
            // The controller may outlive this component
            if let Ok(mut state) = is_open.try_write() {
                *state = open;
            }
            on_visibility_changed.call(open);
        });
    });

    // Bind positioning and click-away once both elements are in the DOM
    let controller = props.controller.clone();
    let positioning = props.positioning;
    let anchor_for_mount = anchor_id.clone();
    let panel_for_mount = panel_id.clone();
    let inside_ids = props.inside_ids.clone();
    let mut click_away = use_signal(|| None::<OutsideClickListener>);
    use_effect(move || {
        bind_position(&controller, &anchor_for_mount, &panel_for_mount, positioning);

        let mut watched = vec![anchor_for_mount.clone(), panel_for_mount.clone()];
        watched.extend(inside_ids.iter().cloned());

        let on_outside = controller.clone();
        let detector = OutsideInteractionDetector::new(
            watched,
            move || {
                on_outside.outside_interaction();
            },
        );
        if let Some(listener) = OutsideClickListener::attach(detector) {
            click_away.set(Some(listener));
        }
    });

    let controller = props.controller.clone();
    use_effect(use_reactive(&props.positioning, move |positioning| {
        controller.set_positioning(positioning);
    }));

    let controller = props.controller.clone();
    let anchor_for_retarget = anchor_id.clone();
    use_effect(use_reactive(&anchor_for_retarget, move |anchor| {
        controller.retarget(&anchor);
    }));

    let controller = props.controller.clone();
    use_drop(move || {
        click_away.write().take();
        controller.detach();
    });

    // Hidden rather than removed so the panel keeps a measurable size
    let visibility = if is_open() { "visible" } else { "hidden; pointer-events: none" };
    let panel_class = props.panel_class.clone();
    let panel_style = props.panel_style.clone();
    let on_trigger_click = props.controller.clone();
    let on_trigger_enter = props.controller.clone();
    let on_panel_enter = props.controller.clone();
    let on_panel_leave = props.controller.clone();

    rsx! {
        if props.anchor_id.is_none() {
            span {
                id: "{trigger_id}",
                class: "twemoji-popup-trigger inline-block",
                onclick: move |_| {
                    on_trigger_click.trigger_click();
                },
                onmouseenter: move |_| {
                    on_trigger_enter.trigger_pointer_enter();
                },
                {props.trigger}
            }
        }

        div {
            id: "{panel_id}",
            class: "twemoji-popup bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 rounded-lg shadow-xl {panel_class}",
            style: "position: fixed; top: 0; left: 0; z-index: 50; visibility: {visibility}; {panel_style}",
            onmouseenter: move |_| {
                on_panel_enter.panel_pointer_enter();
            },
            onmouseleave: move |_| {
                on_panel_leave.panel_pointer_leave();
            },

            if props.positioning.arrow_enabled {
                div { id: "{panel_id}-arrow", class: "twemoji-popup-arrow" }
            }

            {props.children}
        }
    }
}
