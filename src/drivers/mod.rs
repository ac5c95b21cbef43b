//! Actuator drivers, generic over `embedded-hal` traits.

pub mod servo;
pub mod status_led;
