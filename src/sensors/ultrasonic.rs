//! HC-SR04 ultrasonic ranger.
//!
//! A 10 µs trigger pulse starts a measurement; the echo pin then stays
//! high for the round-trip time of the burst. Both edge waits are
//! bounded, so a missing object never blocks the wake loop.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::RangingPort;
use crate::config::WakeConfig;
use crate::error::SensorError;

/// Speed of sound at ~20 °C in cm/s.
pub const SPEED_OF_SOUND_CM_S: f32 = 34_300.0;

const TRIGGER_PULSE_US: u32 = 10;

/// One-way distance for an echo pulse of `pulse` length.
pub fn pulse_to_cm(pulse: Duration) -> f32 {
    pulse.as_secs_f32() * SPEED_OF_SOUND_CM_S / 2.0
}

pub struct HcSr04<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    timeout: Duration,
    valid_min_cm: f32,
    valid_max_cm: f32,
}

impl<T, E, D> HcSr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    pub fn new(trigger: T, echo: E, delay: D, config: &WakeConfig) -> Self {
        Self {
            trigger,
            echo,
            delay,
            timeout: Duration::from_millis(u64::from(config.echo_timeout_ms)),
            valid_min_cm: config.valid_min_cm,
            valid_max_cm: config.valid_max_cm,
        }
    }

    /// Busy-wait until the echo pin reads `level`; returns the instant it did.
    fn wait_for(&mut self, level: bool) -> Result<Instant, SensorError> {
        let start = Instant::now();
        loop {
            let high = self.echo.is_high().map_err(|_| SensorError::BusError)?;
            if high == level {
                return Ok(Instant::now());
            }
            if start.elapsed() >= self.timeout {
                return Err(SensorError::EchoTimeout);
            }
        }
    }

    fn trigger_pulse(&mut self) -> Result<(), SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::BusError)?;
        self.delay.delay_us(2);
        self.trigger.set_high().map_err(|_| SensorError::BusError)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| SensorError::BusError)
    }
}

impl<T, E, D> RangingPort for HcSr04<T, E, D>
where
    T: OutputPin + Send,
    E: InputPin + Send,
    D: DelayNs + Send,
{
    fn read_distance_cm(&mut self) -> Result<f32, SensorError> {
        self.trigger_pulse()?;
        let rise = self.wait_for(true)?;
        let fall = self.wait_for(false)?;
        let cm = pulse_to_cm(fall.duration_since(rise));
        if cm < self.valid_min_cm || cm > self.valid_max_cm {
            return Err(SensorError::OutOfRange);
        }
        Ok(cm)
    }
}
