//! Sensor drivers behind the sensor ports.
//!
//! | Driver        | Implements     | Hardware                    |
//! |---------------|----------------|-----------------------------|
//! | `moisture`    | MoisturePort   | any [`moisture::RawAdc`]     |
//! | `ads1115`     | RawAdc         | TI ADS1115 over I2C         |
//! | `ultrasonic`  | RangingPort    | HC-SR04 trigger/echo GPIO   |
//! | `light`       | LightPort      | none fitted                 |

pub mod ads1115;
pub mod light;
pub mod moisture;
pub mod ultrasonic;
