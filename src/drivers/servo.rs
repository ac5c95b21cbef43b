//! Hobby servo driving the watering valve.
//!
//! 50 Hz PWM; the pulse width maps linearly from `min_pulse_us` at 0° to
//! `max_pulse_us` at 180°. Moves block for `move_time_ms` so the horn
//! reaches its stop before the status is reported.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::info;

use crate::app::ports::ValvePort;
use crate::config::ValveConfig;
use crate::error::{ActuatorError, Result};

/// PWM period at 50 Hz.
pub const SERVO_PERIOD_US: u32 = 20_000;

/// Pulse width for `angle` degrees (clamped to 0..=180).
pub fn angle_to_pulse_us(angle: f32, min_us: u32, max_us: u32) -> u32 {
    let angle = angle.clamp(0.0, 180.0);
    let span = max_us.saturating_sub(min_us) as f32;
    min_us + (angle / 180.0 * span).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValvePosition {
    /// No move commanded since power-up.
    Unknown,
    Open,
    Closed,
}

pub struct ServoValve<P, D> {
    pwm: P,
    delay: D,
    config: ValveConfig,
    position: ValvePosition,
}

impl<P: SetDutyCycle, D: DelayNs> ServoValve<P, D> {
    pub fn new(pwm: P, delay: D, config: ValveConfig) -> Self {
        Self {
            pwm,
            delay,
            config,
            position: ValvePosition::Unknown,
        }
    }

    pub fn position(&self) -> ValvePosition {
        self.position
    }

    fn move_to(&mut self, angle: u8) -> Result<()> {
        let pulse = angle_to_pulse_us(
            f32::from(angle),
            self.config.min_pulse_us,
            self.config.max_pulse_us,
        )
        .min(SERVO_PERIOD_US);
        // Both values fit: pulse <= period = 20 000.
        self.pwm
            .set_duty_cycle_fraction(pulse as u16, SERVO_PERIOD_US as u16)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        info!("Servo: {}° ({}us)", angle, pulse);
        self.delay.delay_ms(self.config.move_time_ms);
        Ok(())
    }
}

impl<P, D> ValvePort for ServoValve<P, D>
where
    P: SetDutyCycle + Send,
    D: DelayNs + Send,
{
    fn open_valve(&mut self) -> Result<String> {
        if self.position == ValvePosition::Open {
            return Ok("Valve is already open.".into());
        }
        self.move_to(self.config.open_angle)?;
        self.position = ValvePosition::Open;
        Ok(format!("Valve is now OPEN ({}°).", self.config.open_angle))
    }

    fn close_valve(&mut self) -> Result<String> {
        if self.position == ValvePosition::Closed {
            return Ok("Valve is already closed.".into());
        }
        self.move_to(self.config.closed_angle)?;
        self.position = ValvePosition::Closed;
        Ok(format!("Valve is now CLOSED ({}°).", self.config.closed_angle))
    }

    fn valve_status(&self) -> String {
        match self.position {
            ValvePosition::Unknown => "Status unknown (no motion yet).".into(),
            ValvePosition::Open => format!("Status: open ({}°)", self.config.open_angle),
            ValvePosition::Closed => format!("Status: closed ({}°)", self.config.closed_angle),
        }
    }
}
