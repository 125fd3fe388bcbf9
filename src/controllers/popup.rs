//! Open/closed state of one floating panel
//!
//! The controller owns the open flag, wires trigger and click-away input to
//! it and keeps the panel positioned. Outside interactions are checked
//! against a copy of the open flag that settles [`VISIBILITY_DEBOUNCE_MS`]
//! after the last transition, so the gesture that opened the panel cannot
//! also close it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{PopupConfig, TriggerType};
use crate::services::positioning::{PositionHandle, PositioningConfig};
use crate::utils::debounce::Debouncer;
use crate::utils::scheduler::Scheduler;

pub const VISIBILITY_DEBOUNCE_MS: u32 = 300;
pub const REPOSITION_DELAY_MS: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupState {
    Closed,
    Open,
}

type VisibilityListener = Rc<dyn Fn(bool)>;

struct PopupInner {
    config: PopupConfig,
    is_open: bool,
    debounced_open: bool,
    position: Option<PositionHandle>,
    listeners: Vec<VisibilityListener>,
    torn_down: bool,
}

#[derive(Clone)]
pub struct PopupController {
    inner: Rc<RefCell<PopupInner>>,
    visibility: Debouncer,
    reposition: Debouncer,
}

impl PartialEq for PopupController {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PopupController {
    pub fn new(config: PopupConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PopupInner {
                config,
                is_open: false,
                debounced_open: false,
                position: None,
                listeners: Vec::new(),
                torn_down: false,
            })),
            visibility: Debouncer::new(Rc::clone(&scheduler), VISIBILITY_DEBOUNCE_MS),
            reposition: Debouncer::new(scheduler, REPOSITION_DELAY_MS),
        }
    }

    /// Subscribe to open/close transitions
    pub fn on_visibility_changed<F>(&self, listener: F)
    where
        F: Fn(bool) + 'static,
    {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    /// Trigger and panel are mounted; transitions are honored from now on
    pub fn attach(&self, position: PositionHandle) {
        let previous = self.inner.borrow_mut().position.replace(position);
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    pub fn detach(&self) {
        let previous = self.inner.borrow_mut().position.take();
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().position.is_some()
    }

    pub fn set_config(&self, config: PopupConfig) {
        self.inner.borrow_mut().config = config;
    }

    /// Recreate the position binding when the positioning options change
    pub fn set_positioning(&self, config: PositioningConfig) {
        let current = self.inner.borrow().position.clone();
        if let Some(current) = current {
            if current.config() != config {
                log::debug!("Positioning changed to {}, recreating", config.placement);
                let recreated = current.recreate(config);
                self.inner.borrow_mut().position = Some(recreated);
            }
        }
    }

    /// Anchor the panel to another element, keeping the positioning options
    pub fn retarget(&self, anchor_id: &str) {
        let current = self.inner.borrow().position.clone();
        if let Some(current) = current {
            if current.anchor_id() != anchor_id {
                let retargeted = current.retarget(anchor_id);
                self.inner.borrow_mut().position = Some(retargeted);
            }
        }
    }

    pub fn position(&self) -> Option<PositionHandle> {
        self.inner.borrow().position.clone()
    }

    pub fn open(&self) -> bool {
        self.transition(true)
    }

    pub fn close(&self) -> bool {
        self.transition(false)
    }

    pub fn toggle(&self) -> bool {
        let open = self.is_open();
        self.transition(!open)
    }

    fn transition(&self, open: bool) -> bool {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            if inner.torn_down || inner.config.disabled || inner.position.is_none() || inner.is_open == open {
                return false;
            }
            inner.is_open = open;
            inner.listeners.clone()
        };
        log::debug!("Popup {}", if open { "opened" } else { "closed" });

        let weak = Rc::downgrade(&self.inner);
        self.visibility.debounce(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.debounced_open = inner.is_open;
            }
        });

        let weak = Rc::downgrade(&self.inner);
        self.reposition.debounce(move || {
            let position = weak.upgrade().and_then(|inner| inner.borrow().position.clone());
            if let Some(position) = position {
                position.recompute();
            }
        });

        for listener in listeners {
            listener(open);
        }
        true
    }

    pub fn trigger_click(&self) -> bool {
        if self.trigger() == TriggerType::Click {
            self.toggle()
        } else {
            false
        }
    }

    pub fn trigger_pointer_enter(&self) -> bool {
        if self.trigger() == TriggerType::Hover {
            self.toggle()
        } else {
            false
        }
    }

    /// Entering the panel keeps it open, it can only be reached while open
    pub fn panel_pointer_enter(&self) -> bool {
        false
    }

    pub fn panel_pointer_leave(&self) -> bool {
        if self.trigger() == TriggerType::Hover {
            self.close()
        } else {
            false
        }
    }

    /// A pointer-down outside trigger and panel
    pub fn outside_interaction(&self) -> bool {
        let should_close = {
            let inner = self.inner.borrow();
            inner.config.close_on_clickaway && inner.debounced_open && inner.is_open
        };
        should_close && self.close()
    }

    fn trigger(&self) -> TriggerType {
        self.inner.borrow().config.trigger
    }

    pub fn is_open(&self) -> bool {
        self.inner.borrow().is_open
    }

    pub fn debounced_open(&self) -> bool {
        self.inner.borrow().debounced_open
    }

    pub fn state(&self) -> PopupState {
        if self.is_open() {
            PopupState::Open
        } else {
            PopupState::Closed
        }
    }

    /// Cancel pending timers and release the position binding
    pub fn teardown(&self) {
        self.visibility.cancel();
        self.reposition.cancel();
        let position = {
            let mut inner = self.inner.borrow_mut();
            inner.torn_down = true;
            inner.listeners.clear();
            inner.position.take()
        };
        if let Some(position) = position {
            position.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::positioning::tests::FixedLayout;
    use crate::services::positioning::{Placement, PositioningAdapter, Rect};
    use crate::utils::scheduler::ManualScheduler;

    struct Fixture {
        scheduler: ManualScheduler,
        layout: Rc<FixedLayout>,
        popup: PopupController,
        events: Rc<RefCell<Vec<bool>>>,
    }

    fn fixture(config: PopupConfig) -> Fixture {
        let scheduler = ManualScheduler::new();
        let layout = FixedLayout::with(&[
            ("trigger", Rect::new(100.0, 300.0, 40.0, 20.0)),
            ("panel", Rect::new(0.0, 0.0, 250.0, 150.0)),
        ]);
        let popup = PopupController::new(config, Rc::new(scheduler.clone()));
        popup.attach(PositioningAdapter::create(
            "trigger",
            "panel",
            PositioningConfig::default(),
            layout.clone(),
        ));

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        popup.on_visibility_changed(move |open| sink.borrow_mut().push(open));

        Fixture {
            scheduler,
            layout,
            popup,
            events,
        }
    }

    fn click_config() -> PopupConfig {
        PopupConfig {
            disabled: false,
            trigger: TriggerType::Click,
            close_on_clickaway: true,
        }
    }

    #[test]
    fn test_open_close_idempotent() {
        let f = fixture(click_config());
        assert!(f.popup.open());
        assert!(!f.popup.open());
        assert_eq!(f.popup.state(), PopupState::Open);
        assert!(f.popup.close());
        assert!(!f.popup.close());
        assert_eq!(*f.events.borrow(), vec![true, false]);
    }

    #[test]
    fn test_debounced_flag_settles_after_window() {
        let f = fixture(click_config());
        f.popup.open();
        f.scheduler.advance(299);
        assert!(!f.popup.debounced_open());
        f.scheduler.advance(1);
        assert!(f.popup.debounced_open());
    }

    #[test]
    fn test_debounced_flag_ignores_superseded_transition() {
        let f = fixture(click_config());
        f.popup.open();
        f.scheduler.advance(100);
        f.popup.close();

        // The open's timer would have fired at 300
        f.scheduler.advance(250);
        assert!(!f.popup.debounced_open());
        f.popup.open();
        f.scheduler.advance(299);
        assert!(!f.popup.debounced_open());
        f.scheduler.advance(1);
        assert_eq!(f.popup.debounced_open(), f.popup.is_open());
    }

    #[test]
    fn test_opening_click_is_not_click_away() {
        let f = fixture(click_config());
        assert!(f.popup.trigger_click());
        assert!(!f.popup.outside_interaction());
        f.scheduler.advance(REPOSITION_DELAY_MS as u64);
        assert!(f.popup.is_open());
        assert_eq!(*f.events.borrow(), vec![true]);

        f.scheduler.advance(VISIBILITY_DEBOUNCE_MS as u64);
        assert!(f.popup.outside_interaction());
        assert!(!f.popup.is_open());
    }

    #[test]
    fn test_rapid_toggles_reposition_once() {
        let f = fixture(click_config());
        let applied = f.layout.apply_count();

        f.popup.toggle();
        f.popup.toggle();
        assert_eq!(*f.events.borrow(), vec![true, false]);

        f.scheduler.advance(REPOSITION_DELAY_MS as u64);
        assert_eq!(f.layout.apply_count(), applied + 1);
        assert!(!f.popup.is_open());
    }

    #[test]
    fn test_click_away_disabled() {
        let f = fixture(PopupConfig {
            close_on_clickaway: false,
            ..click_config()
        });
        f.popup.open();
        f.scheduler.advance(500);
        assert!(!f.popup.outside_interaction());
        assert!(f.popup.is_open());
    }

    #[test]
    fn test_disabled_and_unmounted_are_noops() {
        let f = fixture(PopupConfig {
            disabled: true,
            ..click_config()
        });
        assert!(!f.popup.trigger_click());
        assert!(!f.popup.is_open());

        let scheduler = ManualScheduler::new();
        let unmounted = PopupController::new(click_config(), Rc::new(scheduler));
        assert!(!unmounted.open());
        assert!(!unmounted.is_mounted());
    }

    #[test]
    fn test_hover_trigger() {
        let f = fixture(PopupConfig {
            trigger: TriggerType::Hover,
            ..click_config()
        });
        assert!(!f.popup.trigger_click());
        assert!(f.popup.trigger_pointer_enter());
        assert!(!f.popup.panel_pointer_enter());
        assert!(f.popup.is_open());
        assert!(f.popup.panel_pointer_leave());
        assert!(!f.popup.is_open());
    }

    #[test]
    fn test_click_trigger_ignores_hover() {
        let f = fixture(click_config());
        assert!(!f.popup.trigger_pointer_enter());
        f.popup.open();
        assert!(!f.popup.panel_pointer_leave());
        assert!(f.popup.is_open());
    }

    #[test]
    fn test_set_positioning_recreates_only_on_change() {
        let f = fixture(click_config());
        let first = f.popup.position().unwrap();

        f.popup.set_positioning(PositioningConfig::default());
        assert!(!first.is_disposed());

        f.popup.set_positioning(PositioningConfig {
            placement: Placement::BottomEnd,
            ..PositioningConfig::default()
        });
        assert!(first.is_disposed());
        let second = f.popup.position().unwrap();
        assert_eq!(second.config().placement, Placement::BottomEnd);
    }

    #[test]
    fn test_retarget() {
        let f = fixture(click_config());
        f.layout
            .rects
            .borrow_mut()
            .insert("other".to_string(), Rect::new(600.0, 300.0, 40.0, 20.0));
        let first = f.popup.position().unwrap();

        f.popup.retarget("trigger");
        assert!(!first.is_disposed());

        f.popup.retarget("other");
        assert!(first.is_disposed());
        assert_eq!(f.popup.position().unwrap().anchor_id(), "other");
        assert!(f.popup == f.popup.clone());
    }

    #[test]
    fn test_teardown_cancels_timers() {
        let f = fixture(click_config());
        f.popup.open();
        let position = f.popup.position().unwrap();
        f.popup.teardown();

        f.scheduler.advance(1000);
        assert!(!f.popup.debounced_open());
        assert!(position.is_disposed());
        assert!(!f.popup.close());
        assert_eq!(f.scheduler.pending(), 0);
    }
}
