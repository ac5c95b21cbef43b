//! Simulated hardware for running the controller on a workstation.
//!
//! Every adapter here implements the same `embedded-hal` or port trait as
//! the real part, so the binary wires the real drivers (moisture
//! sampling, servo valve, status LEDs) on top of them.
//!
//! | Adapter        | Stands in for             |
//! |----------------|---------------------------|
//! | `SimSoilAdc`   | ADS1115 + moisture sensor |
//! | `SimLight`     | ambient light sensor      |
//! | `SimVisitor`   | HC-SR04 ranger            |
//! | `SimPin`       | GPIO output               |
//! | `SimPwm`       | hardware PWM channel      |
//! | `StdDelay`     | busy/sleep delay          |

use core::convert::Infallible;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use log::trace;

use crate::app::ports::{LightPort, RangingPort};
use crate::config::MoistureConfig;
use crate::error::SensorError;
use crate::sensors::moisture::RawAdc;

// ── Soil ────────────────────────────────────────────────────

/// Soil that slowly sweeps between the dry and wet calibration points.
pub struct SimSoilAdc {
    start: Instant,
    dry: i32,
    wet: i32,
    period: Duration,
    seq: u32,
}

impl SimSoilAdc {
    pub fn new(cal: &MoistureConfig, period: Duration) -> Self {
        Self {
            start: Instant::now(),
            dry: cal.dry_raw - 80,
            wet: cal.wet_raw + 80,
            period,
            seq: 0,
        }
    }

    /// Triangle wave in 0.0..=1.0 over `period`.
    fn phase(&self) -> f32 {
        let period = self.period.as_secs_f32().max(1.0);
        let t = (self.start.elapsed().as_secs_f32() % period) / period;
        if t < 0.5 { t * 2.0 } else { 2.0 - t * 2.0 }
    }
}

impl RawAdc for SimSoilAdc {
    fn read_raw(&mut self) -> Result<i32, SensorError> {
        self.seq = self.seq.wrapping_add(1);
        // Cheap deterministic jitter, with an occasional spike for the
        // median filter to reject.
        let jitter = (self.seq.wrapping_mul(2_654_435_761) >> 28) as i32 - 8;
        let spike = if self.seq % 23 == 0 { 900 } else { 0 };
        let span = (self.wet - self.dry) as f32;
        Ok(self.dry + (self.phase() * span) as i32 + jitter + spike)
    }
}

// ── Light ───────────────────────────────────────────────────

/// Daylight curve compressed into a few minutes.
pub struct SimLight {
    start: Instant,
    day: Duration,
}

impl SimLight {
    pub fn new(day: Duration) -> Self {
        Self {
            start: Instant::now(),
            day,
        }
    }
}

impl LightPort for SimLight {
    fn read_light(&mut self) -> Result<f32, SensorError> {
        let day = self.day.as_secs_f32().max(1.0);
        let t = (self.start.elapsed().as_secs_f32() % day) / day;
        let lux = (t * core::f32::consts::PI).sin().max(0.0) * 800.0;
        Ok((lux * 10.0).round() / 10.0)
    }
}

// ── Visitor ─────────────────────────────────────────────────

/// Someone who walks up to the plant and leaves again.
pub struct SimVisitor {
    start: Instant,
    near_for: Duration,
    away_for: Duration,
    seq: u32,
}

impl SimVisitor {
    pub fn new(near_for: Duration, away_for: Duration) -> Self {
        Self {
            start: Instant::now(),
            near_for,
            away_for,
            seq: 0,
        }
    }
}

impl RangingPort for SimVisitor {
    fn read_distance_cm(&mut self) -> Result<f32, SensorError> {
        self.seq = self.seq.wrapping_add(1);
        // Every 17th ping loses its echo.
        if self.seq % 17 == 0 {
            return Err(SensorError::EchoTimeout);
        }
        let cycle = (self.near_for + self.away_for).as_millis().max(1);
        let t = self.start.elapsed().as_millis() % cycle;
        if t < self.near_for.as_millis() {
            Ok(40.0)
        } else {
            Ok(180.0)
        }
    }
}

// ── GPIO / PWM / delay ──────────────────────────────────────

/// Output pin that only remembers its level.
pub struct SimPin {
    name: &'static str,
    high: bool,
}

impl SimPin {
    pub fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    pub fn is_set_high(&self) -> bool {
        self.high
    }
}

impl digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        if self.high {
            trace!("{}: low", self.name);
        }
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.high {
            trace!("{}: high", self.name);
        }
        self.high = true;
        Ok(())
    }
}

/// 16-bit PWM channel.
#[derive(Default)]
pub struct SimPwm {
    duty: u16,
}

impl SimPwm {
    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl pwm::ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        trace!("pwm: duty {}", duty);
        self.duty = duty;
        Ok(())
    }
}

/// `DelayNs` backed by `thread::sleep`.
#[derive(Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
