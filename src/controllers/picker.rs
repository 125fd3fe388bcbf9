//! Emoji picker state
//!
//! Tabs, search, selection, recent emojis and the skin-tone long press.
//! The picker and skins panels are driven by their own
//! [`PopupController`]s; this type only decides what they show.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use crate::config::{PickerConfig, PopupConfig, TriggerType};
use crate::controllers::popup::PopupController;
use crate::services::emoji_catalog::{Emoji, EmojiCatalog};
use crate::services::positioning::{Placement, PositioningConfig};
use crate::stores::recent_emojis::RecentEmojiStore;
use crate::stores::storage::StorageBackend;
use crate::utils::debounce::Debouncer;
use crate::utils::html::escape_html;
use crate::utils::scheduler::Scheduler;

pub const SEARCH_DEBOUNCE_MS: u32 = 300;
/// Hold time before the skin-tone popup opens
pub const SKIN_PRESS_MS: u32 = 500;
/// Separation between a pressed emoji and its skins popup
pub const SKINS_OFFSET: i32 = 30;

const RECENT_TAB_LABEL: &str = "🕒";
const FALLBACK_TRIGGER_EMOJI: &str = "😀";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickerTab {
    Recent,
    Group(u32),
}

/// Host notifications in emission order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerEvent {
    /// Text to insert into an attached content area, which then blurs
    AddTextBlur(String),
    EmojiUnicodeAdded(String),
    EmojiImgAdded(String),
}

/// What the emoji grid currently shows
#[derive(Clone, Debug, PartialEq)]
pub enum PickerView {
    Grid(Vec<Emoji>),
    Loading(String),
    NotFound(String),
}

struct PickerState {
    active_tab: Option<PickerTab>,
    search_term: String,
    searching: bool,
    results: Option<Vec<Emoji>>,
    skins_for: Option<Emoji>,
    swallow_click: bool,
    trigger_emoji: String,
    listeners: Vec<Rc<dyn Fn()>>,
}

#[derive(Clone)]
pub struct EmojiPicker {
    config: Rc<RefCell<Rc<PickerConfig>>>,
    catalog: Rc<EmojiCatalog>,
    recents: Rc<RefCell<RecentEmojiStore>>,
    state: Rc<RefCell<PickerState>>,
    search: Debouncer,
    press: Debouncer,
    popup: PopupController,
    skins_popup: PopupController,
}

impl EmojiPicker {
    pub fn new(
        config: PickerConfig,
        catalog: Rc<EmojiCatalog>,
        storage: Rc<dyn StorageBackend>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let mut recents = RecentEmojiStore::new(
            storage,
            config.recent_emoji_storage_name.clone(),
            config.recent_emoji_limit,
        );
        if config.recent_emojis_feat {
            recents.load();
        }

        let popup = PopupController::new(config.popup_config(), Rc::clone(&scheduler));
        let skins_popup = PopupController::new(
            PopupConfig {
                disabled: false,
                trigger: TriggerType::Click,
                close_on_clickaway: true,
            },
            Rc::clone(&scheduler),
        );

        let trigger_emoji = config
            .random_emoji_array
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_TRIGGER_EMOJI.to_string());

        let picker = Self {
            config: Rc::new(RefCell::new(Rc::new(config))),
            catalog,
            recents: Rc::new(RefCell::new(recents)),
            state: Rc::new(RefCell::new(PickerState {
                active_tab: None,
                search_term: String::new(),
                searching: false,
                results: None,
                skins_for: None,
                swallow_click: false,
                trigger_emoji,
                listeners: Vec::new(),
            })),
            search: Debouncer::new(Rc::clone(&scheduler), SEARCH_DEBOUNCE_MS),
            press: Debouncer::new(scheduler, SKIN_PRESS_MS),
            popup,
            skins_popup,
        };

        let initial = picker.tabs().first().copied();
        picker.state.borrow_mut().active_tab = initial;
        picker
    }

    pub fn config(&self) -> Rc<PickerConfig> {
        Rc::clone(&self.config.borrow())
    }

    /// Apply new host options to a live picker; false when nothing changed
    ///
    /// The popup picks up `disabled` and the trigger type at once. Turning a
    /// feature off drops whatever state it had in flight.
    pub fn set_config(&self, config: PickerConfig) -> bool {
        let previous = self.config();
        if *previous == config {
            return false;
        }
        log::debug!("Picker options changed, placement {}", config.placement);

        self.popup.set_config(config.popup_config());
        if !config.search_emojis_feat {
            self.search.cancel();
            let mut state = self.state.borrow_mut();
            state.search_term.clear();
            state.searching = false;
            state.results = None;
        }
        if !config.skins_selection {
            self.press.cancel();
        }
        if config.recent_emojis_feat && !previous.recent_emojis_feat {
            self.recents.borrow_mut().load();
        }
        *self.config.borrow_mut() = Rc::new(config);

        // The recents tab may have come or gone
        let tabs = self.tabs();
        let mut state = self.state.borrow_mut();
        if state.active_tab.map_or(true, |tab| !tabs.contains(&tab)) {
            state.active_tab = tabs.first().copied();
        }
        true
    }

    pub fn catalog(&self) -> &EmojiCatalog {
        &self.catalog
    }

    pub fn popup(&self) -> &PopupController {
        &self.popup
    }

    pub fn skins_popup(&self) -> &PopupController {
        &self.skins_popup
    }

    /// Called after state changes that happen outside an input handler
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn() + 'static,
    {
        self.state.borrow_mut().listeners.push(Rc::new(listener));
    }

    fn notify(state: &Rc<RefCell<PickerState>>) {
        let listeners = state.borrow().listeners.clone();
        for listener in listeners {
            listener();
        }
    }

    fn shows_recent_tab(&self) -> bool {
        self.config().recent_emojis_feat && !self.recents.borrow().is_empty()
    }

    pub fn tabs(&self) -> Vec<PickerTab> {
        let mut tabs = Vec::new();
        if self.shows_recent_tab() {
            tabs.push(PickerTab::Recent);
        }
        tabs.extend(self.catalog.groups_of().iter().map(|pack| PickerTab::Group(pack.group)));
        tabs
    }

    pub fn tab_label(&self, tab: PickerTab) -> String {
        match tab {
            PickerTab::Recent => self.catalog.render_text(&escape_html(RECENT_TAB_LABEL)),
            PickerTab::Group(group) => self.catalog.group_description(group),
        }
    }

    pub fn active_tab(&self) -> Option<PickerTab> {
        self.state.borrow().active_tab
    }

    /// Switch tabs; any search in progress is dropped
    pub fn select_tab(&self, tab: PickerTab) {
        self.search.cancel();
        let mut state = self.state.borrow_mut();
        state.active_tab = Some(tab);
        state.search_term.clear();
        state.searching = false;
        state.results = None;
    }

    pub fn search_term(&self) -> String {
        self.state.borrow().search_term.clone()
    }

    pub fn set_search_term(&self, term: &str) {
        if !self.config().search_emojis_feat {
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            state.search_term = term.to_string();
            state.searching = true;
        }

        let term = term.to_string();
        let catalog = Rc::clone(&self.catalog);
        let weak = Rc::downgrade(&self.state);
        self.search.debounce(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let results = catalog.search(&term);
            log::debug!("Search {:?} matched {} emojis", term, results.len());
            {
                let mut state = state.borrow_mut();
                state.results = Some(results);
                state.searching = false;
            }
            Self::notify(&state);
        });
    }

    pub fn view(&self) -> PickerView {
        let state = self.state.borrow();
        if state.searching {
            return PickerView::Loading(self.config().is_loading_label.clone());
        }
        if let Some(results) = &state.results {
            if results.is_empty() && !state.search_term.trim().is_empty() {
                return PickerView::NotFound(self.config().search_emoji_not_found.clone());
            }
            return PickerView::Grid(results.clone());
        }

        let list = match state.active_tab {
            Some(PickerTab::Recent) => self.recents.borrow().list().to_vec(),
            Some(PickerTab::Group(group)) => self
                .catalog
                .groups_of()
                .iter()
                .find(|pack| pack.group == group)
                .map(|pack| pack.list.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        PickerView::Grid(list)
    }

    /// Emoji clicked in the grid
    ///
    /// The click that ends a skin-tone long press is swallowed.
    pub fn select(&self, emoji: &Emoji) -> Vec<PickerEvent> {
        self.press.cancel();
        let swallowed = std::mem::take(&mut self.state.borrow_mut().swallow_click);
        if swallowed {
            return Vec::new();
        }
        self.emit_selection(emoji)
    }

    /// Variant chosen in the skins popup
    pub fn select_skin(&self, skin: &Emoji) -> Vec<PickerEvent> {
        {
            let mut state = self.state.borrow_mut();
            state.swallow_click = false;
            state.skins_for = None;
        }
        self.skins_popup.close();
        self.emit_selection(skin)
    }

    fn emit_selection(&self, emoji: &Emoji) -> Vec<PickerEvent> {
        let events = vec![
            PickerEvent::AddTextBlur(emoji.unicode.clone()),
            PickerEvent::EmojiUnicodeAdded(emoji.unicode.clone()),
            PickerEvent::EmojiImgAdded(emoji.img.clone()),
        ];
        if self.config().recent_emojis_feat {
            self.recents.borrow_mut().record(emoji.clone());
        }
        events
    }

    pub fn recent_emojis(&self) -> Vec<Emoji> {
        self.recents.borrow().list().to_vec()
    }

    /// Start holding an emoji; opens its skins after [`SKIN_PRESS_MS`]
    pub fn press_start(&self, emoji: &Emoji) {
        if !self.config().skins_selection || emoji.skins.is_empty() {
            return;
        }

        let emoji = emoji.clone();
        let weak = Rc::downgrade(&self.state);
        let skins_popup = self.skins_popup.clone();
        self.press.debounce(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            {
                let mut state = state.borrow_mut();
                state.skins_for = Some(emoji);
                state.swallow_click = true;
            }
            skins_popup.open();
            Self::notify(&state);
        });
    }

    /// Pointer released or left before the hold completed
    pub fn press_end(&self) {
        self.press.cancel();
    }

    pub fn skins_for(&self) -> Option<Emoji> {
        self.state.borrow().skins_for.clone()
    }

    /// Options for the skins popup, anchored on the pressed emoji
    pub fn skins_positioning(&self) -> PositioningConfig {
        PositioningConfig {
            placement: Placement::Top,
            auto_flip: true,
            arrow_enabled: self.config().arrow_enabled,
            extra_offset: SKINS_OFFSET,
        }
    }

    pub fn trigger_emoji(&self) -> String {
        self.state.borrow().trigger_emoji.clone()
    }

    pub fn trigger_markup(&self) -> String {
        self.catalog.render_text(&escape_html(&self.trigger_emoji()))
    }

    /// Show a different random emoji on the trigger button
    pub fn randomize_trigger(&self) {
        let config = self.config();
        let choices = &config.random_emoji_array;
        if choices.is_empty() {
            return;
        }
        let index = rand::thread_rng().gen_range(0..choices.len());
        self.state.borrow_mut().trigger_emoji = choices[index].clone();
    }

    /// Panel width in pixels, measuring the referenced element if any
    pub fn calculated_width<F>(&self, measure: F) -> u32
    where
        F: FnOnce(&str) -> Option<f64>,
    {
        self.config().width.resolve(measure)
    }

    pub fn teardown(&self) {
        self.search.cancel();
        self.press.cancel();
        self.popup.teardown();
        self.skins_popup.teardown();
        self.state.borrow_mut().listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TwemojiOptions;
    use crate::services::emoji_catalog::EmojiDataset;
    use crate::services::positioning::tests::FixedLayout;
    use crate::services::positioning::{PositioningAdapter, Rect};
    use crate::stores::storage::{MemoryStorage, NoStorage};
    use crate::utils::scheduler::ManualScheduler;
    use std::cell::Cell;

    fn catalog() -> Rc<EmojiCatalog> {
        let dataset = EmojiDataset::from_json(
            r#"{
                "groups": [{"group": 0, "description": "😀"}, {"group": 1, "description": "👋"}],
                "emojis": [
                    {"unicode": "😀", "group": 0, "tags": ["grinning face"]},
                    {"unicode": "😂", "group": 0, "tags": ["face with tears of joy"]},
                    {"unicode": "👋", "group": 1, "tags": ["waving hand"], "skins": ["👋🏻", "👋🏿"]}
                ]
            }"#,
        )
        .unwrap();
        Rc::new(EmojiCatalog::new(&dataset, Some(TwemojiOptions::default())))
    }

    fn picker_with(config: PickerConfig, storage: Rc<dyn StorageBackend>) -> (ManualScheduler, EmojiPicker) {
        let scheduler = ManualScheduler::new();
        let picker = EmojiPicker::new(config, catalog(), storage, Rc::new(scheduler.clone()));
        (scheduler, picker)
    }

    fn grid(picker: &EmojiPicker) -> Vec<String> {
        match picker.view() {
            PickerView::Grid(list) => list.into_iter().map(|e| e.unicode).collect(),
            other => panic!("expected grid, got {:?}", other),
        }
    }

    fn attach_skins(picker: &EmojiPicker) {
        let layout = FixedLayout::with(&[
            ("emoji", Rect::new(100.0, 300.0, 20.0, 20.0)),
            ("skins", Rect::new(0.0, 0.0, 120.0, 30.0)),
        ]);
        picker
            .skins_popup()
            .attach(PositioningAdapter::create("emoji", "skins", picker.skins_positioning(), layout));
    }

    #[test]
    fn test_tabs_without_recents() {
        let (_, picker) = picker_with(PickerConfig::default(), Rc::new(NoStorage));
        assert_eq!(picker.tabs(), vec![PickerTab::Group(0), PickerTab::Group(1)]);
        assert_eq!(picker.active_tab(), Some(PickerTab::Group(0)));
        assert_eq!(grid(&picker), vec!["😀", "😂"]);

        picker.select_tab(PickerTab::Group(1));
        assert_eq!(grid(&picker), vec!["👋"]);
        assert!(picker.tab_label(PickerTab::Group(1)).contains("1f44b"));
    }

    #[test]
    fn test_recent_tab_only_when_non_empty() {
        let storage = MemoryStorage::new();
        let config = PickerConfig {
            recent_emojis_feat: true,
            ..PickerConfig::default()
        };

        let (_, picker) = picker_with(config.clone(), Rc::new(storage.clone()));
        assert!(!picker.tabs().contains(&PickerTab::Recent));

        let grinning = catalog().find("😀").cloned().unwrap();
        picker.select(&grinning);
        assert_eq!(picker.tabs()[0], PickerTab::Recent);

        // A new picker sharing the storage opens on the recents tab
        let (_, reopened) = picker_with(config, Rc::new(storage));
        assert_eq!(reopened.active_tab(), Some(PickerTab::Recent));
        assert_eq!(grid(&reopened), vec!["😀"]);
    }

    #[test]
    fn test_select_event_order() {
        let (_, picker) = picker_with(PickerConfig::default(), Rc::new(NoStorage));
        let emoji = catalog().find("😂").cloned().unwrap();
        let events = picker.select(&emoji);
        assert_eq!(
            events,
            vec![
                PickerEvent::AddTextBlur("😂".to_string()),
                PickerEvent::EmojiUnicodeAdded("😂".to_string()),
                PickerEvent::EmojiImgAdded(emoji.img.clone()),
            ]
        );
        // Recent feature off: nothing recorded
        assert!(picker.recent_emojis().is_empty());
    }

    #[test]
    fn test_search_is_debounced() {
        let config = PickerConfig {
            search_emojis_feat: true,
            ..PickerConfig::default()
        };
        let (scheduler, picker) = picker_with(config, Rc::new(NoStorage));
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        picker.on_change(move || counter.set(counter.get() + 1));

        picker.set_search_term("wav");
        assert_eq!(picker.view(), PickerView::Loading("Loading...".to_string()));
        scheduler.advance(150);
        picker.set_search_term("waving");
        scheduler.advance(299);
        assert!(matches!(picker.view(), PickerView::Loading(_)));
        scheduler.advance(1);
        assert_eq!(grid(&picker), vec!["👋"]);
        assert_eq!(changes.get(), 1);

        picker.set_search_term("zebra");
        scheduler.advance(300);
        assert_eq!(picker.view(), PickerView::NotFound("No emojis found.".to_string()));

        picker.set_search_term("");
        scheduler.advance(300);
        assert_eq!(grid(&picker), vec!["😀", "😂"]);
    }

    #[test]
    fn test_search_disabled() {
        let (scheduler, picker) = picker_with(PickerConfig::default(), Rc::new(NoStorage));
        picker.set_search_term("wave");
        scheduler.advance(300);
        assert_eq!(picker.search_term(), "");
        assert_eq!(grid(&picker), vec!["😀", "😂"]);
    }

    #[test]
    fn test_select_tab_cancels_search() {
        let config = PickerConfig {
            search_emojis_feat: true,
            ..PickerConfig::default()
        };
        let (scheduler, picker) = picker_with(config, Rc::new(NoStorage));
        picker.set_search_term("face");
        picker.select_tab(PickerTab::Group(1));
        scheduler.advance(300);
        assert_eq!(grid(&picker), vec!["👋"]);
    }

    #[test]
    fn test_long_press_opens_skins_and_swallows_click() {
        let config = PickerConfig {
            skins_selection: true,
            ..PickerConfig::default()
        };
        let (scheduler, picker) = picker_with(config, Rc::new(NoStorage));
        attach_skins(&picker);
        let wave = catalog().find("👋").cloned().unwrap();

        picker.press_start(&wave);
        scheduler.advance(499);
        assert!(picker.skins_for().is_none());
        scheduler.advance(1);
        assert_eq!(picker.skins_for().map(|e| e.unicode), Some("👋".to_string()));
        assert!(picker.skins_popup().is_open());

        // Releasing the long press clicks the emoji underneath
        assert!(picker.select(&wave).is_empty());

        let dark = wave.skins[1].clone();
        let events = picker.select_skin(&dark);
        assert_eq!(events[0], PickerEvent::AddTextBlur("👋🏿".to_string()));
        assert!(!picker.skins_popup().is_open());
        assert!(picker.skins_for().is_none());
    }

    #[test]
    fn test_short_press_selects_normally() {
        let config = PickerConfig {
            skins_selection: true,
            ..PickerConfig::default()
        };
        let (scheduler, picker) = picker_with(config, Rc::new(NoStorage));
        let wave = catalog().find("👋").cloned().unwrap();

        picker.press_start(&wave);
        scheduler.advance(200);
        picker.press_end();
        scheduler.advance(500);
        assert!(picker.skins_for().is_none());
        assert_eq!(picker.select(&wave).len(), 3);
    }

    #[test]
    fn test_press_without_skins_feature() {
        let (scheduler, picker) = picker_with(PickerConfig::default(), Rc::new(NoStorage));
        let wave = catalog().find("👋").cloned().unwrap();
        picker.press_start(&wave);
        scheduler.advance(1000);
        assert!(picker.skins_for().is_none());
    }

    #[test]
    fn test_random_trigger_emoji() {
        let config = PickerConfig {
            random_emoji_array: vec!["😎".to_string(), "🤓".to_string()],
            ..PickerConfig::default()
        };
        let (_, picker) = picker_with(config, Rc::new(NoStorage));
        assert_eq!(picker.trigger_emoji(), "😎");
        for _ in 0..10 {
            picker.randomize_trigger();
            assert!(["😎", "🤓"].contains(&picker.trigger_emoji().as_str()));
        }
        assert!(picker.trigger_markup().starts_with("<img"));
    }

    #[test]
    fn test_set_config_toggles_disabled() {
        let (_, picker) = picker_with(PickerConfig::default(), Rc::new(NoStorage));
        let layout = FixedLayout::with(&[
            ("trigger", Rect::new(100.0, 300.0, 30.0, 30.0)),
            ("panel", Rect::new(0.0, 0.0, 250.0, 200.0)),
        ]);
        picker
            .popup()
            .attach(PositioningAdapter::create("trigger", "panel", picker.config().positioning_config(), layout));

        picker.set_config(PickerConfig {
            disabled: true,
            ..PickerConfig::default()
        });
        assert!(picker.config().disabled);
        assert!(!picker.popup().trigger_click());
        assert!(!picker.popup().is_open());

        assert!(picker.set_config(PickerConfig::default()));
        assert!(!picker.set_config(PickerConfig::default()));
        assert!(picker.popup().trigger_click());
        assert!(picker.popup().is_open());
    }

    #[test]
    fn test_set_config_drops_search_in_flight() {
        let config = PickerConfig {
            search_emojis_feat: true,
            ..PickerConfig::default()
        };
        let (scheduler, picker) = picker_with(config, Rc::new(NoStorage));
        picker.set_search_term("wav");
        assert!(matches!(picker.view(), PickerView::Loading(_)));

        picker.set_config(PickerConfig::default());
        scheduler.advance(1000);
        assert_eq!(picker.search_term(), "");
        assert_eq!(grid(&picker), vec!["😀", "😂"]);
    }

    #[test]
    fn test_calculated_width() {
        let (_, picker) = picker_with(PickerConfig::default(), Rc::new(NoStorage));
        assert_eq!(picker.calculated_width(|_| None), 250);
    }
}
