//! Moisture level classifier with hysteresis and a minimum hold time.
//!
//! Maps a raw moisture reading onto three ordered levels. Two boundaries
//! split the raw axis:
//!
//! ```text
//!          b_low                 b_high
//!   DRY      |        MOIST        |       WET
//! ───────────┼─────────────────────┼──────────────▶ raw
//!        ±hysteresis           ±hysteresis
//! ```
//!
//! * A boundary value belongs to the lower zone.
//! * Leaving a level requires crossing its boundary by the hysteresis
//!   margin, one level per transition.
//! * After a transition the level is held for `min_hold_ms` regardless
//!   of the input.
//! * A missing reading clears the latch and yields [`MoistureLevel::Unknown`].
//!
//! The classifier owns its latch; callers sharing it between threads must
//! wrap it in a lock.

use log::{debug, info};

use crate::config::MoistureConfig;

/// Classified soil moisture level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoistureLevel {
    /// No valid reading available.
    #[default]
    Unknown,
    Dry,
    Moist,
    Wet,
}

/// Status-LED naming of the same levels.
pub type LedColour = MoistureLevel;

impl MoistureLevel {
    pub const RED: LedColour = MoistureLevel::Dry;
    pub const YELLOW: LedColour = MoistureLevel::Moist;
    pub const GREEN: LedColour = MoistureLevel::Wet;

    /// Upper-case label used by renderers and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Dry => "DRY",
            Self::Moist => "MOIST",
            Self::Wet => "WET",
        }
    }

    /// LED colour name for this level.
    pub fn colour_name(self) -> &'static str {
        match self {
            Self::Unknown => "OFF",
            Self::Dry => "RED",
            Self::Moist => "YELLOW",
            Self::Wet => "GREEN",
        }
    }
}

/// Raw-axis thresholds, derived once from calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low: i32,
    pub high: i32,
    pub hysteresis: i32,
    pub min_hold_ms: u64,
}

impl From<&MoistureConfig> for Thresholds {
    fn from(c: &MoistureConfig) -> Self {
        Self {
            low: c.boundary_low(),
            high: c.boundary_high(),
            hysteresis: c.hysteresis_raw,
            min_hold_ms: c.min_hold_ms,
        }
    }
}

impl Thresholds {
    /// Zone containing `raw`, without hysteresis.
    pub fn zone(&self, raw: i32) -> MoistureLevel {
        if raw <= self.low {
            MoistureLevel::Dry
        } else if raw <= self.high {
            MoistureLevel::Moist
        } else {
            MoistureLevel::Wet
        }
    }
}

/// Latching hysteresis classifier.
pub struct HysteresisClassifier {
    thresholds: Thresholds,
    current: MoistureLevel,
    /// Monotonic time of the last level change; `None` while unlatched.
    last_change_ms: Option<u64>,
}

impl HysteresisClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            current: MoistureLevel::Unknown,
            last_change_ms: None,
        }
    }

    pub fn from_config(config: &MoistureConfig) -> Self {
        Self::new(Thresholds::from(config))
    }

    /// Currently latched level.
    pub fn current(&self) -> MoistureLevel {
        self.current
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Classify a reading taken at `now_ms` (monotonic milliseconds).
    pub fn classify(&mut self, raw: Option<i32>, now_ms: u64) -> MoistureLevel {
        let Some(raw) = raw else {
            if self.current != MoistureLevel::Unknown {
                info!("Classifier: reading unavailable, latch cleared");
            }
            self.current = MoistureLevel::Unknown;
            self.last_change_ms = None;
            return self.current;
        };

        let Some(last_change) = self.last_change_ms else {
            self.current = self.thresholds.zone(raw);
            self.last_change_ms = Some(now_ms);
            info!("Classifier: initial level {} (raw={})", self.current.label(), raw);
            return self.current;
        };

        if now_ms.saturating_sub(last_change) < self.thresholds.min_hold_ms {
            debug!("Classifier: holding {} (raw={})", self.current.label(), raw);
            return self.current;
        }

        let next = self.next_level(raw);
        if next != self.current {
            info!(
                "Classifier: {} -> {} (raw={})",
                self.current.label(),
                next.label(),
                raw
            );
            self.current = next;
            self.last_change_ms = Some(now_ms);
        }
        self.current
    }

    fn next_level(&self, raw: i32) -> MoistureLevel {
        let t = &self.thresholds;
        match self.current {
            MoistureLevel::Dry if raw >= t.low.saturating_add(t.hysteresis) => MoistureLevel::Moist,
            MoistureLevel::Moist if raw <= t.low.saturating_sub(t.hysteresis) => MoistureLevel::Dry,
            MoistureLevel::Moist if raw >= t.high.saturating_add(t.hysteresis) => MoistureLevel::Wet,
            MoistureLevel::Wet if raw <= t.high.saturating_sub(t.hysteresis) => MoistureLevel::Moist,
            // Unknown with a latch cannot happen; treat as a fresh zone pick.
            MoistureLevel::Unknown => t.zone(raw),
            other => other,
        }
    }
}
