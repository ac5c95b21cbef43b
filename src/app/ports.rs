//! Port traits: the boundary between the controller and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller / scheduler / wake monitor
//! ```
//!
//! Sensor and actuator adapters implement these traits. The domain core
//! only ever sees the trait objects, so the simulator and the real
//! drivers are interchangeable.

use crate::error::{Result, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One stabilised moisture measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoistureReading {
    /// Calibrated percentage, clamped to 0–100.
    pub percent: u8,
    /// Stabilised raw ADC value.
    pub raw: i32,
}

/// Soil moisture sensor.
pub trait MoisturePort: Send {
    /// Read and stabilise one measurement. May take tens of milliseconds.
    fn read_moisture(&mut self) -> core::result::Result<MoistureReading, SensorError>;
}

/// Ambient light sensor.
pub trait LightPort: Send {
    fn read_light(&mut self) -> core::result::Result<f32, SensorError>;
}

/// Distance sensor used for the proximity wake.
pub trait RangingPort: Send {
    /// Distance in centimetres. Bounded in time; a missing echo is an error.
    fn read_distance_cm(&mut self) -> core::result::Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Servo-driven watering valve.
///
/// `open_valve` and `close_valve` block for the mechanical move time and
/// return the status text to display. Both are idempotent.
pub trait ValvePort: Send {
    fn open_valve(&mut self) -> Result<String>;
    fn close_valve(&mut self) -> Result<String>;
    fn valve_status(&self) -> String;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (domain callback)
// ───────────────────────────────────────────────────────────────

/// Periodic jobs the scheduler can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    Moisture,
    Light,
}

/// What happened when a poll fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The job ran to completion.
    Ran,
    /// The job was skipped because a read was already in flight.
    Skipped,
}

/// Called by the [`Scheduler`](crate::scheduler::Scheduler) when a poll is due.
pub trait SchedulerDelegate {
    fn on_poll_due(&mut self, label: &str, target: PollTarget) -> TickOutcome;
}
