//! The record held by the shared state store.
//!
//! `AppState` is the single struct renderers read from. It contains the
//! active screen, the latest accepted sensor readings, the valve status
//! text and the wake flag. Readers always receive a full clone.

use core::fmt;
use core::str::FromStr;

use crate::classifier::MoistureLevel;

/// Screens of the menu UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    Menu,
    Moisture,
    Light,
    Water,
    Dashboard,
}

impl Screen {
    /// Every screen in menu order.
    pub const ALL: [Screen; 5] = [
        Screen::Menu,
        Screen::Moisture,
        Screen::Light,
        Screen::Water,
        Screen::Dashboard,
    ];

    /// Stable identifier (`"menu"`, `"moisture"`, ...).
    pub fn id(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Moisture => "moisture",
            Self::Light => "light",
            Self::Water => "water",
            Self::Dashboard => "dashboard",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Menu => "Smart Plant Menu",
            Self::Moisture => "Moisture",
            Self::Light => "Light",
            Self::Water => "Watering",
            Self::Dashboard => "Dashboard",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unrecognised screen identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScreen;

impl fmt::Display for UnknownScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown screen")
    }
}

impl std::error::Error for UnknownScreen {}

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.id().eq_ignore_ascii_case(s.trim()))
            .ok_or(UnknownScreen)
    }
}

/// Whether the UI should be lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeState {
    Awake,
    Asleep,
}

/// Snapshot of everything the renderers display.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub screen: Screen,
    pub ui_awake: bool,
    /// Last accepted moisture percentage (0–100); `None` before the first read.
    pub moisture_percent: Option<u8>,
    /// Last accepted stabilised raw ADC value.
    pub moisture_raw: Option<i32>,
    pub moisture_level: MoistureLevel,
    /// Last accepted light value.
    pub light: Option<f32>,
    /// Status text reported by the valve driver.
    pub valve_text: String,
}

impl AppState {
    /// Startup state: menu screen, awake, no readings yet.
    pub fn new(valve_text: impl Into<String>) -> Self {
        Self {
            screen: Screen::Menu,
            ui_awake: true,
            moisture_percent: None,
            moisture_raw: None,
            moisture_level: MoistureLevel::Unknown,
            light: None,
            valve_text: valve_text.into(),
        }
    }

    pub fn wake_state(&self) -> WakeState {
        if self.ui_awake {
            WakeState::Awake
        } else {
            WakeState::Asleep
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(String::new())
    }
}
