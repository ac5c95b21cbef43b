//! Capacitive soil moisture sensor.
//!
//! The sensor sits on an external ADC. Single conversions are noisy, so
//! each read stacks two median filters:
//!
//! ```text
//!  fast_samples × ADC ──median──▶ history[history_len] ──median──▶ raw
//!                                                                   │
//!                            piecewise curve (dry,0)(moist,50)(wet,100)
//!                                                                   ▼
//!                                                                percent
//! ```
//!
//! Failed samples are dropped. If a whole burst fails the previous
//! history median is reported again.

use heapless::{Deque, Vec};
use log::warn;

use crate::app::ports::{MoistureReading, MoisturePort};
use crate::config::{MAX_FAST_SAMPLES, MAX_MOISTURE_HISTORY, MoistureConfig};
use crate::error::SensorError;

/// Single-conversion ADC source.
pub trait RawAdc: Send {
    fn read_raw(&mut self) -> Result<i32, SensorError>;
}

/// Three-point calibration curve, sorted by raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentCurve {
    points: [(i32, f32); 3],
}

impl PercentCurve {
    pub fn new(dry_raw: i32, moist_raw: i32, wet_raw: i32) -> Self {
        let mut points = [(dry_raw, 0.0), (moist_raw, 50.0), (wet_raw, 100.0)];
        points.sort_by_key(|p| p.0);
        Self { points }
    }

    pub fn from_config(c: &MoistureConfig) -> Self {
        Self::new(c.dry_raw, c.moist_raw, c.wet_raw)
    }

    /// Interpolated percentage, rounded and clamped to 0..=100.
    pub fn percent(&self, raw: i32) -> u8 {
        let [first, mid, last] = self.points;
        let pct = if raw <= first.0 {
            first.1
        } else if raw >= last.0 {
            last.1
        } else {
            let (a, b) = if raw <= mid.0 { (first, mid) } else { (mid, last) };
            let span = (b.0 - a.0) as f32;
            if span <= 0.0 {
                b.1
            } else {
                a.1 + (raw - a.0) as f32 / span * (b.1 - a.1)
            }
        };
        pct.round().clamp(0.0, 100.0) as u8
    }
}

/// Median of `values`; averages the two middle elements for even counts.
pub fn median(values: &mut [i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let sum = i64::from(values[mid - 1]) + i64::from(values[mid]);
        i32::try_from(sum / 2).ok()
    }
}

pub struct MoistureSensor<A: RawAdc> {
    adc: A,
    curve: PercentCurve,
    fast_samples: usize,
    history_len: usize,
    history: Deque<i32, MAX_MOISTURE_HISTORY>,
}

impl<A: RawAdc> MoistureSensor<A> {
    pub fn new(adc: A, config: &MoistureConfig) -> Self {
        Self {
            adc,
            curve: PercentCurve::from_config(config),
            fast_samples: config.fast_samples.clamp(1, MAX_FAST_SAMPLES),
            history_len: config.history_len.clamp(1, MAX_MOISTURE_HISTORY),
            history: Deque::new(),
        }
    }

    fn history_median(&self) -> Option<i32> {
        let mut buf: Vec<i32, MAX_MOISTURE_HISTORY> = self.history.iter().copied().collect();
        median(&mut buf)
    }

    fn burst_median(&mut self) -> Option<i32> {
        let mut samples: Vec<i32, MAX_FAST_SAMPLES> = Vec::new();
        let mut failures = 0usize;
        for _ in 0..self.fast_samples {
            match self.adc.read_raw() {
                // Capacity equals the clamp above.
                Ok(v) => {
                    let _ = samples.push(v);
                }
                Err(_) => failures += 1,
            }
        }
        if failures > 0 {
            warn!("Moisture: {}/{} ADC samples failed", failures, self.fast_samples);
        }
        median(&mut samples)
    }
}

impl<A: RawAdc> MoisturePort for MoistureSensor<A> {
    fn read_moisture(&mut self) -> Result<MoistureReading, SensorError> {
        if let Some(sample) = self.burst_median() {
            while self.history.len() >= self.history_len {
                self.history.pop_front();
            }
            let _ = self.history.push_back(sample);
        }
        let raw = self.history_median().ok_or(SensorError::AdcReadFailed)?;
        Ok(MoistureReading {
            percent: self.curve.percent(raw),
            raw,
        })
    }
}
