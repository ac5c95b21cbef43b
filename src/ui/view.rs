//! Renderer-neutral view model.
//!
//! Turns an [`AppState`] snapshot into the lines a screen shows, picks the
//! plant "mood" and decides whether a redraw is needed at all.

use std::path::{Path, PathBuf};

use crate::app::state::{AppState, Screen};
use crate::classifier::MoistureLevel;
use crate::config::UiConfig;

/// Plant mood derived from the moisture percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Unknown,
    Red,
    Yellow,
    Green,
}

impl Mood {
    pub fn from_percent(percent: Option<u8>, ui: &UiConfig) -> Self {
        match percent {
            None => Self::Unknown,
            Some(p) if p >= ui.green_from_percent => Self::Green,
            Some(p) if p >= ui.yellow_from_percent => Self::Yellow,
            Some(_) => Self::Red,
        }
    }

    fn asset_stem(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }

    /// Text glyph used when no icon asset is available.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Unknown => "(?)",
            Self::Red => ":(",
            Self::Yellow => ":|",
            Self::Green => ":)",
        }
    }
}

/// Icon to draw for a mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Asset(PathBuf),
    Glyph(&'static str),
}

/// Mood icons found on disk.
#[derive(Debug, Default, Clone)]
pub struct IconSet {
    red: Option<PathBuf>,
    yellow: Option<PathBuf>,
    green: Option<PathBuf>,
}

impl IconSet {
    /// Look for `<mood>_smiley.png` (or `<mood> smiley.png`) in `dir`.
    pub fn load(dir: &Path) -> Self {
        let find = |mood: Mood| {
            [
                format!("{}_smiley.png", mood.asset_stem()),
                format!("{} smiley.png", mood.asset_stem()),
            ]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
        };
        let set = Self {
            red: find(Mood::Red),
            yellow: find(Mood::Yellow),
            green: find(Mood::Green),
        };
        if set.red.is_none() || set.yellow.is_none() || set.green.is_none() {
            log::warn!("Icons: some mood assets missing in {}, using glyphs", dir.display());
        }
        set
    }

    pub fn icon(&self, mood: Mood) -> Icon {
        let path = match mood {
            Mood::Red => self.red.as_ref(),
            Mood::Yellow => self.yellow.as_ref(),
            Mood::Green => self.green.as_ref(),
            Mood::Unknown => None,
        };
        path.map_or(Icon::Glyph(mood.glyph()), |p| Icon::Asset(p.clone()))
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub title: &'static str,
    pub lines: Vec<String>,
    pub mood: Mood,
    pub awake: bool,
}

fn moisture_line(st: &AppState) -> String {
    match (st.moisture_percent, st.moisture_raw) {
        (Some(pct), Some(raw)) => format!("Moisture: {pct}% (raw {raw})"),
        _ => "Moisture: --".to_string(),
    }
}

fn light_line(st: &AppState) -> String {
    match st.light {
        Some(v) => format!("Light: {v:.1}"),
        None => "Light: no sensor".to_string(),
    }
}

impl ViewModel {
    pub fn from_state(st: &AppState, ui: &UiConfig) -> Self {
        let mood = Mood::from_percent(st.moisture_percent, ui);
        let lines = match st.screen {
            Screen::Menu => Screen::ALL[1..]
                .iter()
                .enumerate()
                .map(|(i, s)| format!("[{}] {}", i + 1, s.title()))
                .collect(),
            Screen::Moisture => vec![
                moisture_line(st),
                format!("Level: {}", st.moisture_level.label()),
                format!("Mood: {}", mood.glyph()),
            ],
            Screen::Light => vec![light_line(st)],
            Screen::Water => vec![st.valve_text.clone(), "[open] [close]".to_string()],
            Screen::Dashboard => vec![
                moisture_line(st),
                format!("LED: {}", st.moisture_level.colour_name()),
                light_line(st),
                format!("Valve: {}", st.valve_text),
            ],
        };
        Self {
            screen: st.screen,
            title: st.screen.title(),
            lines,
            mood,
            awake: st.ui_awake,
        }
    }
}

/// Fields whose change requires a redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderKey {
    screen: Screen,
    percent: Option<u8>,
    raw: Option<i32>,
    level: MoistureLevel,
    light: Option<u32>,
    valve_text: String,
    awake: bool,
}

impl From<&AppState> for RenderKey {
    fn from(st: &AppState) -> Self {
        Self {
            screen: st.screen,
            percent: st.moisture_percent,
            raw: st.moisture_raw,
            level: st.moisture_level,
            light: st.light.map(f32::to_bits),
            valve_text: st.valve_text.clone(),
            awake: st.ui_awake,
        }
    }
}

/// Remembers the last drawn key.
#[derive(Debug, Default)]
pub struct RenderCache {
    last: Option<RenderKey>,
}

impl RenderCache {
    /// `true` if `st` differs from what was last drawn; records it.
    pub fn needs_redraw(&mut self, st: &AppState) -> bool {
        let key = RenderKey::from(st);
        if self.last.as_ref() == Some(&key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    /// Force the next frame to redraw.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
