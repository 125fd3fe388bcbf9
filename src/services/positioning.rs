//! Floating element positioning
//!
//! [`PlacementEngine`] is a pure function from an anchor rect, a floating
//! size and the viewport to screen coordinates. [`PositioningAdapter`] binds
//! it to a [`LayoutSource`] so a popup can recompute its position on demand
//! after it becomes visible or changes size.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Edge length of the arrow element in pixels
pub const ARROW_SIZE: f64 = 8.0;
/// Minimum distance between the arrow and the floating element's corner
const ARROW_PADDING: f64 = 4.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Auto,
    AutoStart,
    AutoEnd,
    Top,
    #[default]
    TopStart,
    TopEnd,
    Bottom,
    BottomStart,
    BottomEnd,
    Right,
    RightStart,
    RightEnd,
    Left,
    LeftStart,
    LeftEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    Start,
    Center,
    End,
}

impl Placement {
    pub const ALL: [Placement; 15] = [
        Placement::Auto,
        Placement::AutoStart,
        Placement::AutoEnd,
        Placement::Top,
        Placement::TopStart,
        Placement::TopEnd,
        Placement::Bottom,
        Placement::BottomStart,
        Placement::BottomEnd,
        Placement::Right,
        Placement::RightStart,
        Placement::RightEnd,
        Placement::Left,
        Placement::LeftStart,
        Placement::LeftEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Auto => "auto",
            Placement::AutoStart => "auto-start",
            Placement::AutoEnd => "auto-end",
            Placement::Top => "top",
            Placement::TopStart => "top-start",
            Placement::TopEnd => "top-end",
            Placement::Bottom => "bottom",
            Placement::BottomStart => "bottom-start",
            Placement::BottomEnd => "bottom-end",
            Placement::Right => "right",
            Placement::RightStart => "right-start",
            Placement::RightEnd => "right-end",
            Placement::Left => "left",
            Placement::LeftStart => "left-start",
            Placement::LeftEnd => "left-end",
        }
    }

    /// Preferred side, `None` for the auto placements
    pub fn side(&self) -> Option<Side> {
        match self {
            Placement::Auto | Placement::AutoStart | Placement::AutoEnd => None,
            Placement::Top | Placement::TopStart | Placement::TopEnd => Some(Side::Top),
            Placement::Bottom | Placement::BottomStart | Placement::BottomEnd => Some(Side::Bottom),
            Placement::Right | Placement::RightStart | Placement::RightEnd => Some(Side::Right),
            Placement::Left | Placement::LeftStart | Placement::LeftEnd => Some(Side::Left),
        }
    }

    pub fn alignment(&self) -> Alignment {
        match self {
            Placement::AutoStart
            | Placement::TopStart
            | Placement::BottomStart
            | Placement::RightStart
            | Placement::LeftStart => Alignment::Start,
            Placement::AutoEnd
            | Placement::TopEnd
            | Placement::BottomEnd
            | Placement::RightEnd
            | Placement::LeftEnd => Alignment::End,
            _ => Alignment::Center,
        }
    }

    /// Whether the placement names one of the four sides
    pub fn is_primary_axis(&self) -> bool {
        self.side().is_some()
    }

    pub fn from_parts(side: Side, alignment: Alignment) -> Self {
        match (side, alignment) {
            (Side::Top, Alignment::Start) => Placement::TopStart,
            (Side::Top, Alignment::Center) => Placement::Top,
            (Side::Top, Alignment::End) => Placement::TopEnd,
            (Side::Bottom, Alignment::Start) => Placement::BottomStart,
            (Side::Bottom, Alignment::Center) => Placement::Bottom,
            (Side::Bottom, Alignment::End) => Placement::BottomEnd,
            (Side::Right, Alignment::Start) => Placement::RightStart,
            (Side::Right, Alignment::Center) => Placement::Right,
            (Side::Right, Alignment::End) => Placement::RightEnd,
            (Side::Left, Alignment::Start) => Placement::LeftStart,
            (Side::Left, Alignment::Center) => Placement::Left,
            (Side::Left, Alignment::End) => Placement::LeftEnd,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| WidgetError::config(format!("unknown placement {:?}", s)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Immutable positioning options of one popup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositioningConfig {
    pub placement: Placement,
    pub auto_flip: bool,
    pub arrow_enabled: bool,
    pub extra_offset: i32,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            placement: Placement::TopStart,
            auto_flip: true,
            arrow_enabled: true,
            extra_offset: 5,
        }
    }
}

impl PositioningConfig {
    /// Main-axis separation between anchor and floating element
    ///
    /// Side placements get `extra_offset`; the auto placements get none.
    pub fn extra_offset_for(&self) -> f64 {
        if self.placement.is_primary_axis() {
            self.extra_offset as f64
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComputedPosition {
    pub x: f64,
    pub y: f64,
    /// Placement actually used after auto resolution and flipping
    pub placement: Placement,
    /// Arrow offset along the floating element's edge, when enabled
    pub arrow: Option<f64>,
    pub flipped: bool,
}

pub struct PlacementEngine {
    config: PositioningConfig,
}

impl PlacementEngine {
    pub fn new(config: PositioningConfig) -> Self {
        Self { config }
    }

    pub fn compute(&self, anchor: Rect, floating: Size, viewport: Rect) -> ComputedPosition {
        let alignment = self.config.placement.alignment();
        let offset = self.config.extra_offset_for();

        let preferred = self
            .config
            .placement
            .side()
            .unwrap_or_else(|| Self::side_with_most_room(anchor, floating, viewport));

        let (mut x, mut y) = Self::coords(preferred, alignment, anchor, floating, offset);
        let mut side = preferred;
        let mut flipped = false;

        if self.config.auto_flip {
            let overflow = Self::main_overflow(side, x, y, floating, viewport);
            if overflow > 0.0 {
                let opposite = side.opposite();
                let (ox, oy) = Self::coords(opposite, alignment, anchor, floating, offset);
                if Self::main_overflow(opposite, ox, oy, floating, viewport) < overflow {
                    x = ox;
                    y = oy;
                    side = opposite;
                    flipped = true;
                }
            }
        }

        // Keep the cross axis inside the viewport
        if side.is_vertical() {
            x = Self::clamp_axis(x, floating.width, viewport.x, viewport.right());
        } else {
            y = Self::clamp_axis(y, floating.height, viewport.y, viewport.bottom());
        }

        let arrow = self.config.arrow_enabled.then(|| {
            let (center, start, length) = if side.is_vertical() {
                (anchor.x + anchor.width / 2.0, x, floating.width)
            } else {
                (anchor.y + anchor.height / 2.0, y, floating.height)
            };
            let max = (length - ARROW_SIZE - ARROW_PADDING).max(ARROW_PADDING);
            (center - start - ARROW_SIZE / 2.0).clamp(ARROW_PADDING, max)
        });

        ComputedPosition {
            x,
            y,
            placement: Placement::from_parts(side, alignment),
            arrow,
            flipped,
        }
    }

    fn coords(side: Side, alignment: Alignment, anchor: Rect, floating: Size, offset: f64) -> (f64, f64) {
        let cross = |start: f64, anchor_len: f64, floating_len: f64| match alignment {
            Alignment::Start => start,
            Alignment::Center => start + (anchor_len - floating_len) / 2.0,
            Alignment::End => start + anchor_len - floating_len,
        };

        match side {
            Side::Top => (
                cross(anchor.x, anchor.width, floating.width),
                anchor.y - floating.height - offset,
            ),
            Side::Bottom => (
                cross(anchor.x, anchor.width, floating.width),
                anchor.bottom() + offset,
            ),
            Side::Left => (
                anchor.x - floating.width - offset,
                cross(anchor.y, anchor.height, floating.height),
            ),
            Side::Right => (
                anchor.right() + offset,
                cross(anchor.y, anchor.height, floating.height),
            ),
        }
    }

    /// Pixels by which the floating element leaves the viewport on `side`
    fn main_overflow(side: Side, x: f64, y: f64, floating: Size, viewport: Rect) -> f64 {
        match side {
            Side::Top => viewport.y - y,
            Side::Bottom => y + floating.height - viewport.bottom(),
            Side::Left => viewport.x - x,
            Side::Right => x + floating.width - viewport.right(),
        }
    }

    fn side_with_most_room(anchor: Rect, floating: Size, viewport: Rect) -> Side {
        let rooms = [
            (Side::Top, anchor.y - viewport.y - floating.height),
            (Side::Bottom, viewport.bottom() - anchor.bottom() - floating.height),
            (Side::Right, viewport.right() - anchor.right() - floating.width),
            (Side::Left, anchor.x - viewport.x - floating.width),
        ];

        let mut best = rooms[0];
        for candidate in &rooms[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        best.0
    }

    fn clamp_axis(value: f64, length: f64, min: f64, max: f64) -> f64 {
        let upper = max - length;
        if upper < min {
            min
        } else {
            value.clamp(min, upper)
        }
    }
}

/// Reads element geometry and writes computed positions
pub trait LayoutSource {
    fn rect_of(&self, id: &str) -> Option<Rect>;
    fn viewport(&self) -> Rect;
    fn apply(&self, floating_id: &str, position: &ComputedPosition);
}

pub struct PositioningAdapter {
    layout: Rc<dyn LayoutSource>,
}

impl PositioningAdapter {
    pub fn new(layout: Rc<dyn LayoutSource>) -> Self {
        Self { layout }
    }

    /// Shorthand for `PositioningAdapter::new(layout).compute(..)`
    pub fn create(
        anchor_id: &str,
        floating_id: &str,
        config: PositioningConfig,
        layout: Rc<dyn LayoutSource>,
    ) -> PositionHandle {
        Self::new(layout).compute(anchor_id, floating_id, config)
    }

    /// Bind an anchor and a floating element and position them once
    pub fn compute(&self, anchor_id: &str, floating_id: &str, config: PositioningConfig) -> PositionHandle {
        let handle = PositionHandle {
            inner: Rc::new(RefCell::new(HandleInner {
                anchor_id: anchor_id.to_string(),
                floating_id: floating_id.to_string(),
                config,
                layout: Rc::clone(&self.layout),
                last: None,
                disposed: false,
            })),
        };
        handle.recompute();
        handle
    }
}

struct HandleInner {
    anchor_id: String,
    floating_id: String,
    config: PositioningConfig,
    layout: Rc<dyn LayoutSource>,
    last: Option<ComputedPosition>,
    disposed: bool,
}

/// Live binding between an anchor and a floating element
#[derive(Clone)]
pub struct PositionHandle {
    inner: Rc<RefCell<HandleInner>>,
}

impl PositionHandle {
    /// Re-measure and reposition
    ///
    /// A no-op after [`dispose`](Self::dispose) or while either element is
    /// not measurable.
    pub fn recompute(&self) -> Option<ComputedPosition> {
        let (anchor_id, floating_id, config, layout) = {
            let inner = self.inner.borrow();
            if inner.disposed {
                return None;
            }
            (
                inner.anchor_id.clone(),
                inner.floating_id.clone(),
                inner.config,
                Rc::clone(&inner.layout),
            )
        };

        let anchor = layout.rect_of(&anchor_id)?;
        let floating = layout.rect_of(&floating_id)?.size();
        let position = PlacementEngine::new(config).compute(anchor, floating, layout.viewport());

        layout.apply(&floating_id, &position);
        self.inner.borrow_mut().last = Some(position);
        Some(position)
    }

    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.disposed {
            log::debug!("Disposing position handle for #{}", inner.floating_id);
            inner.disposed = true;
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    pub fn last(&self) -> Option<ComputedPosition> {
        self.inner.borrow().last
    }

    pub fn config(&self) -> PositioningConfig {
        self.inner.borrow().config
    }

    pub fn anchor_id(&self) -> String {
        self.inner.borrow().anchor_id.clone()
    }

    /// Dispose this handle and bind the same elements under `config`
    pub fn recreate(&self, config: PositioningConfig) -> PositionHandle {
        let anchor_id = self.anchor_id();
        self.rebind(&anchor_id, config)
    }

    /// Dispose this handle and anchor the floating element elsewhere
    pub fn retarget(&self, anchor_id: &str) -> PositionHandle {
        let config = self.config();
        self.rebind(anchor_id, config)
    }

    fn rebind(&self, anchor_id: &str, config: PositioningConfig) -> PositionHandle {
        self.dispose();
        let (floating_id, layout) = {
            let inner = self.inner.borrow();
            (inner.floating_id.clone(), Rc::clone(&inner.layout))
        };
        PositioningAdapter::new(layout).compute(anchor_id, &floating_id, config)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Layout double with fixed rects and a record of applied positions
    #[derive(Default)]
    pub(crate) struct FixedLayout {
        pub rects: RefCell<HashMap<String, Rect>>,
        pub applied: RefCell<Vec<(String, ComputedPosition)>>,
    }

    impl FixedLayout {
        pub fn with(rects: &[(&str, Rect)]) -> Rc<Self> {
            let layout = Self::default();
            for (id, rect) in rects {
                layout.rects.borrow_mut().insert(id.to_string(), *rect);
            }
            Rc::new(layout)
        }

        pub fn apply_count(&self) -> usize {
            self.applied.borrow().len()
        }
    }

    impl LayoutSource for FixedLayout {
        fn rect_of(&self, id: &str) -> Option<Rect> {
            self.rects.borrow().get(id).copied()
        }

        fn viewport(&self) -> Rect {
            Rect::new(0.0, 0.0, 1000.0, 800.0)
        }

        fn apply(&self, floating_id: &str, position: &ComputedPosition) {
            self.applied.borrow_mut().push((floating_id.to_string(), *position));
        }
    }

    const VIEWPORT: Rect = Rect { x: 0.0, y: 0.0, width: 1000.0, height: 800.0 };
    const PANEL: Size = Size { width: 250.0, height: 150.0 };

    fn config(placement: Placement) -> PositioningConfig {
        PositioningConfig {
            placement,
            ..PositioningConfig::default()
        }
    }

    #[test]
    fn test_placement_parse() {
        assert_eq!("top-start".parse::<Placement>().unwrap(), Placement::TopStart);
        assert_eq!("auto-end".parse::<Placement>().unwrap(), Placement::AutoEnd);
        assert!("middle".parse::<Placement>().is_err());
        for placement in Placement::ALL {
            assert_eq!(placement.as_str().parse::<Placement>().unwrap(), placement);
        }
    }

    #[test]
    fn test_extra_offset_only_for_sides() {
        assert_eq!(config(Placement::TopStart).extra_offset_for(), 5.0);
        assert_eq!(config(Placement::Left).extra_offset_for(), 5.0);
        assert_eq!(config(Placement::Auto).extra_offset_for(), 0.0);
        assert_eq!(config(Placement::AutoStart).extra_offset_for(), 0.0);
    }

    #[test]
    fn test_top_start() {
        let anchor = Rect::new(100.0, 300.0, 40.0, 20.0);
        let position = PlacementEngine::new(config(Placement::TopStart)).compute(anchor, PANEL, VIEWPORT);

        assert_eq!(position.x, 100.0);
        assert_eq!(position.y, 300.0 - 150.0 - 5.0);
        assert_eq!(position.placement, Placement::TopStart);
        assert!(!position.flipped);
        // Arrow centred on the anchor
        assert_eq!(position.arrow, Some(20.0 - ARROW_SIZE / 2.0));
    }

    #[test]
    fn test_flip_when_top_overflows() {
        let anchor = Rect::new(100.0, 50.0, 40.0, 20.0);
        let position = PlacementEngine::new(config(Placement::TopStart)).compute(anchor, PANEL, VIEWPORT);

        assert_eq!(position.placement, Placement::BottomStart);
        assert_eq!(position.y, 75.0);
        assert!(position.flipped);

        let no_flip = PositioningConfig {
            auto_flip: false,
            ..config(Placement::TopStart)
        };
        let position = PlacementEngine::new(no_flip).compute(anchor, PANEL, VIEWPORT);
        assert_eq!(position.placement, Placement::TopStart);
        assert_eq!(position.y, -105.0);
    }

    #[test]
    fn test_cross_axis_clamped() {
        let anchor = Rect::new(950.0, 400.0, 40.0, 20.0);
        let position = PlacementEngine::new(config(Placement::TopStart)).compute(anchor, PANEL, VIEWPORT);
        assert_eq!(position.x, 750.0);
    }

    #[test]
    fn test_auto_picks_roomiest_side() {
        let anchor = Rect::new(400.0, 10.0, 40.0, 20.0);
        let position = PlacementEngine::new(config(Placement::Auto)).compute(anchor, PANEL, VIEWPORT);
        assert_eq!(position.placement, Placement::Bottom);
        assert_eq!(position.y, 30.0);
    }

    #[test]
    fn test_arrow_disabled() {
        let no_arrow = PositioningConfig {
            arrow_enabled: false,
            ..config(Placement::Right)
        };
        let anchor = Rect::new(100.0, 300.0, 40.0, 20.0);
        let position = PlacementEngine::new(no_arrow).compute(anchor, PANEL, VIEWPORT);
        assert_eq!(position.arrow, None);
        assert_eq!(position.x, 145.0);
        assert_eq!(position.y, 300.0 + (20.0 - 150.0) / 2.0);
    }

    #[test]
    fn test_handle_recompute_and_dispose() {
        let layout = FixedLayout::with(&[
            ("trigger", Rect::new(100.0, 300.0, 40.0, 20.0)),
            ("panel", Rect::new(0.0, 0.0, 250.0, 150.0)),
        ]);

        let handle = PositioningAdapter::create("trigger", "panel", config(Placement::TopStart), layout.clone());
        assert_eq!(layout.apply_count(), 1);
        assert_eq!(handle.last().map(|p| p.y), Some(145.0));

        layout
            .rects
            .borrow_mut()
            .insert("trigger".to_string(), Rect::new(100.0, 500.0, 40.0, 20.0));
        assert_eq!(handle.recompute().map(|p| p.y), Some(345.0));

        handle.dispose();
        assert!(handle.recompute().is_none());
        assert_eq!(layout.apply_count(), 2);
    }

    #[test]
    fn test_handle_noop_without_elements() {
        let layout = FixedLayout::with(&[("trigger", Rect::new(0.0, 0.0, 10.0, 10.0))]);
        let handle = PositioningAdapter::create("trigger", "missing", config(Placement::Top), layout.clone());
        assert!(handle.last().is_none());
        assert_eq!(layout.apply_count(), 0);
    }

    #[test]
    fn test_recreate_disposes_previous() {
        let layout = FixedLayout::with(&[
            ("trigger", Rect::new(100.0, 300.0, 40.0, 20.0)),
            ("panel", Rect::new(0.0, 0.0, 250.0, 150.0)),
        ]);
        let first = PositioningAdapter::create("trigger", "panel", config(Placement::TopStart), layout.clone());
        let second = first.recreate(config(Placement::BottomStart));

        assert!(first.is_disposed());
        assert!(!second.is_disposed());
        assert_eq!(second.last().map(|p| p.placement), Some(Placement::BottomStart));
    }

    #[test]
    fn test_retarget_keeps_config() {
        let layout = FixedLayout::with(&[
            ("first", Rect::new(100.0, 300.0, 40.0, 20.0)),
            ("second", Rect::new(500.0, 300.0, 40.0, 20.0)),
            ("panel", Rect::new(0.0, 0.0, 250.0, 150.0)),
        ]);
        let first = PositioningAdapter::create("first", "panel", config(Placement::TopStart), layout.clone());
        let second = first.retarget("second");

        assert!(first.is_disposed());
        assert_eq!(second.anchor_id(), "second");
        assert_eq!(second.config(), first.config());
        assert_eq!(second.last().map(|p| p.x), Some(500.0));
    }
}
