//! Touch input: calibration, hit-testing and click debouncing.
//!
//! Resistive panels report 12-bit raw coordinates in the panel's native
//! orientation. [`TouchMapper`] turns them into screen pixels,
//! [`TouchDebouncer`] turns a stream of pressed/released samples into
//! single clicks, and [`route_touch`] maps a click on a screen to an
//! intent.

use crate::app::commands::UiIntent;
use crate::app::state::Screen;
use crate::config::TouchConfig;

/// Screen pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned rectangle, inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Hit test with extra padding around the visible bounds.
    pub fn hit(&self, p: Point, pad_x: i32, pad_y: i32) -> bool {
        p.x >= self.x1 - pad_x
            && p.x <= self.x2 + pad_x
            && p.y >= self.y1 - pad_y
            && p.y <= self.y2 + pad_y
    }
}

// ── Calibration ─────────────────────────────────────────────

/// Raw panel reading to screen pixels.
pub struct TouchMapper {
    cal: TouchConfig,
    width: i32,
    height: i32,
}

impl TouchMapper {
    pub fn new(cal: TouchConfig, width: u16, height: u16) -> Self {
        Self {
            cal,
            width: i32::from(width),
            height: i32::from(height),
        }
    }

    pub fn map(&self, raw_x: u16, raw_y: u16) -> Point {
        let (rx, ry) = if self.cal.swap_xy {
            (raw_y, raw_x)
        } else {
            (raw_x, raw_y)
        };
        let mut x = scale(rx, self.cal.x_min, self.cal.x_max, self.width);
        let mut y = scale(ry, self.cal.y_min, self.cal.y_max, self.height);
        if self.cal.invert_x {
            x = self.width - 1 - x;
        }
        if self.cal.invert_y {
            y = self.height - 1 - y;
        }
        Point { x, y }
    }
}

fn scale(raw: u16, min: u16, max: u16, size: i32) -> i32 {
    let span = i32::from(max) - i32::from(min);
    if span <= 0 || size <= 0 {
        return 0;
    }
    let v = (i32::from(raw) - i32::from(min)) * (size - 1) / span;
    v.clamp(0, size - 1)
}

// ── Debounce ────────────────────────────────────────────────

/// Accepts one click per press.
///
/// A press is accepted if the last accepted click is older than the
/// debounce interval. Further pressed samples are ignored until the
/// panel reports a release, or until the release timeout expires.
pub struct TouchDebouncer {
    debounce_ms: u64,
    release_timeout_ms: u64,
    last_accept_ms: Option<u64>,
    held_since_ms: Option<u64>,
}

impl TouchDebouncer {
    pub fn new(debounce_ms: u64, release_timeout_ms: u64) -> Self {
        Self {
            debounce_ms,
            release_timeout_ms,
            last_accept_ms: None,
            held_since_ms: None,
        }
    }

    /// Feed one sample; `true` means a click was accepted.
    pub fn sample(&mut self, pressed: bool, now_ms: u64) -> bool {
        if !pressed {
            self.held_since_ms = None;
            return false;
        }
        if let Some(since) = self.held_since_ms {
            if now_ms.saturating_sub(since) < self.release_timeout_ms {
                return false;
            }
        }
        if let Some(last) = self.last_accept_ms {
            if now_ms.saturating_sub(last) < self.debounce_ms {
                return false;
            }
        }
        self.last_accept_ms = Some(now_ms);
        self.held_since_ms = Some(now_ms);
        true
    }
}

// ── Layout + routing ────────────────────────────────────────

/// Button geometry for the menu and the detail pages.
pub struct Layout {
    width: i32,
    height: i32,
}

const MARGIN_X: i32 = 70;
const BUTTON_H: i32 = 45;
const BUTTON_GAP: i32 = 5;
const TOP_Y: i32 = 40;

/// Menu order below the title.
pub const MENU_ENTRIES: [Screen; 4] = [
    Screen::Moisture,
    Screen::Light,
    Screen::Water,
    Screen::Dashboard,
];

impl Layout {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: i32::from(width),
            height: i32::from(height),
        }
    }

    pub fn menu_button(&self, index: usize) -> Rect {
        let i = index as i32;
        let y1 = TOP_Y + i * (BUTTON_H + BUTTON_GAP);
        Rect::new(MARGIN_X, y1, self.width - MARGIN_X, y1 + BUTTON_H)
    }

    pub fn back_button(&self) -> Rect {
        Rect::new(10, self.height - 50, 120, self.height - 10)
    }

    pub fn refresh_button(&self) -> Rect {
        Rect::new(self.width - 140, self.height - 50, self.width - 10, self.height - 10)
    }

    pub fn open_button(&self) -> Rect {
        Rect::new(30, 120, self.width / 2 - 10, 180)
    }

    pub fn close_button(&self) -> Rect {
        Rect::new(self.width / 2 + 10, 120, self.width - 30, 180)
    }
}

/// Intent for a click at `p` on `screen`, if it hit a control.
pub fn route_touch(screen: Screen, p: Point, layout: &Layout) -> Option<UiIntent> {
    match screen {
        Screen::Menu => MENU_ENTRIES
            .iter()
            .enumerate()
            // Whole row is clickable; vertical padding stays inside the gap.
            .find(|(i, _)| layout.menu_button(*i).hit(p, MARGIN_X, BUTTON_GAP / 2))
            .map(|(_, s)| UiIntent::Goto(*s)),
        _ if layout.back_button().hit(p, 20, 20) => Some(UiIntent::Goto(Screen::Menu)),
        Screen::Moisture | Screen::Light | Screen::Dashboard
            if layout.refresh_button().hit(p, 20, 20) =>
        {
            Some(UiIntent::Refresh)
        }
        Screen::Water if layout.open_button().hit(p, 10, 10) => Some(UiIntent::OpenValve),
        Screen::Water if layout.close_button().hit(p, 10, 10) => Some(UiIntent::CloseValve),
        _ => None,
    }
}

// ── Panel ───────────────────────────────────────────────────

/// Calibration, debounce and routing for one touch panel.
pub struct TouchPanel {
    mapper: TouchMapper,
    debouncer: TouchDebouncer,
    layout: Layout,
}

impl TouchPanel {
    pub fn from_config(ui: &crate::config::UiConfig) -> Self {
        Self {
            mapper: TouchMapper::new(ui.touch.clone(), ui.width, ui.height),
            debouncer: TouchDebouncer::new(ui.touch_debounce_ms, ui.touch_release_timeout_ms),
            layout: Layout::new(ui.width, ui.height),
        }
    }

    /// Feed a pressed sample at raw panel coordinates.
    pub fn press(&mut self, raw_x: u16, raw_y: u16, now_ms: u64, screen: Screen) -> Option<UiIntent> {
        if !self.debouncer.sample(true, now_ms) {
            return None;
        }
        let p = self.mapper.map(raw_x, raw_y);
        let intent = route_touch(screen, p, &self.layout);
        log::debug!("Touch: ({},{}) on {} -> {:?}", p.x, p.y, screen, intent);
        intent
    }

    /// Feed a released sample.
    pub fn release(&mut self, now_ms: u64) {
        self.debouncer.sample(false, now_ms);
    }
}
