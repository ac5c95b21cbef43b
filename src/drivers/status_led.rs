//! Three-LED moisture indicator.
//!
//! Discrete red, yellow and green LEDs on three GPIO outputs. Exactly one
//! is lit for a known level; all are dark for `Unknown`.

use embedded_hal::digital::OutputPin;

use crate::classifier::LedColour;
use crate::error::ActuatorError;

pub struct MoistureLeds<R, Y, G> {
    red: R,
    yellow: Y,
    green: G,
    current: LedColour,
}

impl<R: OutputPin, Y: OutputPin, G: OutputPin> MoistureLeds<R, Y, G> {
    /// Take the pins and switch everything off.
    pub fn new(red: R, yellow: Y, green: G) -> Result<Self, ActuatorError> {
        let mut leds = Self {
            red,
            yellow,
            green,
            current: LedColour::Unknown,
        };
        leds.apply(LedColour::Unknown)?;
        Ok(leds)
    }

    /// Light the LED for `colour`, darkening the others.
    pub fn show(&mut self, colour: LedColour) -> Result<(), ActuatorError> {
        self.apply(colour)?;
        self.current = colour;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.show(LedColour::Unknown)
    }

    pub fn current(&self) -> LedColour {
        self.current
    }

    fn apply(&mut self, colour: LedColour) -> Result<(), ActuatorError> {
        set(&mut self.red, colour == LedColour::RED)?;
        set(&mut self.yellow, colour == LedColour::YELLOW)?;
        set(&mut self.green, colour == LedColour::GREEN)
    }
}

fn set(pin: &mut impl OutputPin, on: bool) -> Result<(), ActuatorError> {
    pin.set_state(on.into())
        .map_err(|_| ActuatorError::GpioWriteFailed)
}
