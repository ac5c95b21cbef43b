//! Ambient light input.
//!
//! The appliance ships without a light sensor; this port always reports
//! `Unavailable` so the light screen shows its placeholder.

use crate::app::ports::LightPort;
use crate::error::SensorError;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoLightSensor;

impl LightPort for NoLightSensor {
    fn read_light(&mut self) -> Result<f32, SensorError> {
        Err(SensorError::Unavailable)
    }
}
