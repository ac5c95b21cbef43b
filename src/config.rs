//! System configuration parameters
//!
//! All tunable parameters for the Plantwacht appliance. Calibration
//! constants live here as data; there is one parameterised implementation
//! of each component. Values can be overridden from a JSON file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Upper bound for the proximity filter window (stack-allocated buffer).
pub const MAX_FILTER_WINDOW: usize = 16;

/// Upper bound for the rolling moisture history.
pub const MAX_MOISTURE_HISTORY: usize = 32;

/// Upper bound for fast ADC samples taken per moisture read.
pub const MAX_FAST_SAMPLES: usize = 32;

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    pub moisture: MoistureConfig,
    pub wake: WakeConfig,
    pub scheduler: SchedulerConfig,
    pub valve: ValveConfig,
    pub ui: UiConfig,
}

/// Capacitive moisture sensor calibration and classifier tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureConfig {
    // --- Calibration (raw ADC counts) ---
    /// Raw reading of the sensor in dry soil (0 %).
    pub dry_raw: i32,
    /// Raw reading of the sensor in moist soil (50 %).
    pub moist_raw: i32,
    /// Raw reading of the sensor in wet soil (100 %).
    pub wet_raw: i32,

    // --- Classifier boundaries ---
    /// Offset below `moist_raw` where the DRY/MOIST boundary sits.
    pub moist_margin: i32,
    /// Offset below `wet_raw` where the MOIST/WET boundary sits.
    pub wet_margin: i32,
    /// Hysteresis applied on both sides of each boundary.
    pub hysteresis_raw: i32,
    /// Minimum time between two level changes (milliseconds).
    pub min_hold_ms: u64,

    // --- Sampling ---
    /// ADC samples per read; their median is the fast value.
    pub fast_samples: usize,
    /// Rolling history length; the reported raw is its median.
    pub history_len: usize,

    // --- Notification ---
    /// Raw movement below this does not notify renderers on its own.
    pub notify_raw_delta: i32,
}

impl MoistureConfig {
    /// DRY/MOIST boundary (`b_low`).
    pub fn boundary_low(&self) -> i32 {
        self.moist_raw.saturating_sub(self.moist_margin)
    }

    /// MOIST/WET boundary (`b_high`).
    pub fn boundary_high(&self) -> i32 {
        self.wet_raw.saturating_sub(self.wet_margin)
    }
}

impl Default for MoistureConfig {
    fn default() -> Self {
        Self {
            dry_raw: 4837,
            moist_raw: 4939,
            wet_raw: 5274,
            moist_margin: 60,
            wet_margin: 140,
            hysteresis_raw: 10,
            min_hold_ms: 350,
            fast_samples: 15,
            history_len: 9,
            notify_raw_delta: 40,
        }
    }
}

/// Ultrasonic proximity wake/sleep tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeConfig {
    /// Distance at or below which someone counts as "near" (cm).
    pub threshold_cm: f32,
    /// Extra distance beyond the threshold required to count as "far" (cm).
    pub hysteresis_cm: f32,
    /// Consecutive near samples required to wake.
    pub on_confirm: u8,
    /// Consecutive far samples required to sleep.
    pub off_confirm: u8,
    /// Moving-average window over the last N valid samples.
    pub filter_window: usize,
    /// Ranging polls per second.
    pub poll_hz: u32,
    /// Shortest plausible echo distance (cm).
    pub valid_min_cm: f32,
    /// Longest plausible echo distance (cm).
    pub valid_max_cm: f32,
    /// Bound on each echo edge wait (milliseconds).
    pub echo_timeout_ms: u32,
}

impl WakeConfig {
    /// Sleep between two ranging polls.
    pub fn poll_period_ms(&self) -> u64 {
        1000 / u64::from(self.poll_hz.max(1))
    }
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            threshold_cm: 70.0,
            hysteresis_cm: 8.0,
            on_confirm: 2,
            off_confirm: 3,
            filter_window: 5,
            poll_hz: 8,
            valid_min_cm: 2.0,
            valid_max_cm: 500.0,
            echo_timeout_ms: 30,
        }
    }
}

/// Periodic sensor polling cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Granularity of the polling thread (milliseconds).
    pub tick_ms: u64,
    /// Moisture poll interval after a completed poll.
    pub moisture_interval_ms: u64,
    /// Retry delay when a moisture poll was still in flight.
    pub moisture_busy_retry_ms: u64,
    /// Light poll interval.
    pub light_interval_ms: u64,
    /// Retry delay when a light poll was still in flight.
    pub light_busy_retry_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            moisture_interval_ms: 300,
            moisture_busy_retry_ms: 700,
            light_interval_ms: 2000,
            light_busy_retry_ms: 500,
        }
    }
}

/// Servo-driven valve geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValveConfig {
    /// Pulse width at 0° (microseconds).
    pub min_pulse_us: u32,
    /// Pulse width at 180° (microseconds).
    pub max_pulse_us: u32,
    /// Servo angle with the valve open.
    pub open_angle: u8,
    /// Servo angle with the valve closed.
    pub closed_angle: u8,
    /// Time allowed for the horn to reach its position.
    pub move_time_ms: u32,
}

impl Default for ValveConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 600,
            max_pulse_us: 2400,
            open_angle: 70,
            closed_angle: 60,
            move_time_ms: 800,
        }
    }
}

/// Touch calibration for the resistive panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
    pub swap_xy: bool,
    pub invert_x: bool,
    pub invert_y: bool,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            x_min: 200,
            x_max: 3900,
            y_min: 200,
            y_max: 3900,
            swap_xy: true,
            invert_x: false,
            invert_y: true,
        }
    }
}

/// Renderer-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Moisture percentage from which the mood is green.
    pub green_from_percent: u8,
    /// Moisture percentage from which the mood is yellow.
    pub yellow_from_percent: u8,
    /// Renderer cadence when nothing was signalled (milliseconds).
    pub render_interval_ms: u64,
    /// Minimum gap between two accepted touches.
    pub touch_debounce_ms: u64,
    /// Give up waiting for a release after this long.
    pub touch_release_timeout_ms: u64,
    /// Panel width in pixels (landscape).
    pub width: u16,
    /// Panel height in pixels (landscape).
    pub height: u16,
    pub touch: TouchConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            green_from_percent: 70,
            yellow_from_percent: 35,
            render_interval_ms: 250,
            touch_debounce_ms: 180,
            touch_release_timeout_ms: 700,
            width: 320,
            height: 240,
            touch: TouchConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation + loading
// ---------------------------------------------------------------------------

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No config file at the given path.
    NotFound,
    /// The file exists but could not be deserialized.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error while reading the file.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Config("config not found"),
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::IoError => Self::Config("config I/O error"),
        }
    }
}

impl PlantConfig {
    /// Reject values that would make a component misbehave.
    /// Invalid ranges are rejected, not silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.moisture;
        if !(m.dry_raw < m.moist_raw && m.moist_raw < m.wet_raw) {
            return Err(ConfigError::ValidationFailed(
                "moisture: dry_raw < moist_raw < wet_raw required",
            ));
        }
        if m.moist_margin < 0 || m.wet_margin < 0 || m.hysteresis_raw < 0 {
            return Err(ConfigError::ValidationFailed("moisture: margins must be >= 0"));
        }
        if m.boundary_low() >= m.boundary_high() {
            return Err(ConfigError::ValidationFailed(
                "moisture: DRY/MOIST boundary must sit below MOIST/WET boundary",
            ));
        }
        if m.hysteresis_raw > m.boundary_high().saturating_sub(m.boundary_low()) {
            return Err(ConfigError::ValidationFailed(
                "moisture: hysteresis_raw wider than the MOIST band",
            ));
        }
        if m.fast_samples == 0 || m.fast_samples > MAX_FAST_SAMPLES {
            return Err(ConfigError::ValidationFailed("moisture: fast_samples out of range"));
        }
        if m.history_len == 0 || m.history_len > MAX_MOISTURE_HISTORY {
            return Err(ConfigError::ValidationFailed("moisture: history_len out of range"));
        }

        let w = &self.wake;
        if w.on_confirm == 0 || w.off_confirm == 0 {
            return Err(ConfigError::ValidationFailed("wake: confirm counts must be >= 1"));
        }
        if w.filter_window == 0 || w.filter_window > MAX_FILTER_WINDOW {
            return Err(ConfigError::ValidationFailed("wake: filter_window must be 1..=16"));
        }
        if w.poll_hz == 0 {
            return Err(ConfigError::ValidationFailed("wake: poll_hz must be > 0"));
        }
        if w.hysteresis_cm < 0.0 || w.threshold_cm <= 0.0 {
            return Err(ConfigError::ValidationFailed("wake: threshold/hysteresis out of range"));
        }
        if w.valid_min_cm >= w.valid_max_cm {
            return Err(ConfigError::ValidationFailed("wake: valid_min_cm must be < valid_max_cm"));
        }

        let s = &self.scheduler;
        if s.tick_ms == 0
            || s.moisture_interval_ms == 0
            || s.moisture_busy_retry_ms == 0
            || s.light_interval_ms == 0
            || s.light_busy_retry_ms == 0
        {
            return Err(ConfigError::ValidationFailed("scheduler: intervals must be > 0"));
        }

        let v = &self.valve;
        if v.min_pulse_us >= v.max_pulse_us || v.max_pulse_us > 20_000 {
            return Err(ConfigError::ValidationFailed("valve: pulse range invalid"));
        }
        if v.open_angle > 180 || v.closed_angle > 180 {
            return Err(ConfigError::ValidationFailed("valve: angles must be 0..=180"));
        }

        let u = &self.ui;
        if u.yellow_from_percent >= u.green_from_percent || u.green_from_percent > 100 {
            return Err(ConfigError::ValidationFailed(
                "ui: yellow_from_percent < green_from_percent <= 100 required",
            ));
        }
        if u.touch.x_min >= u.touch.x_max || u.touch.y_min >= u.touch.y_max {
            return Err(ConfigError::ValidationFailed("ui: touch calibration inverted"));
        }
        if u.width == 0 || u.height == 0 {
            return Err(ConfigError::ValidationFailed("ui: panel size must be > 0"));
        }

        Ok(())
    }
}

/// Load and validate configuration from a JSON file.
pub fn load(path: impl AsRef<Path>) -> Result<PlantConfig, ConfigError> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::NotFound,
        _ => ConfigError::IoError,
    })?;
    let config: PlantConfig = serde_json::from_str(&text).map_err(|e| {
        log::warn!("config parse error: {}", e);
        ConfigError::Corrupted
    })?;
    config.validate()?;
    Ok(config)
}
