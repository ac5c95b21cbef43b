//! Adapters: concrete implementations of the port traits and host glue.
//!
//! | Adapter  | Implements                     | Connects to              |
//! |----------|--------------------------------|--------------------------|
//! | `sim`    | RawAdc, LightPort, RangingPort | simulated garden         |
//! |          | OutputPin, SetDutyCycle        |                          |
//! | `time`   | Clock                          | `std::time::Instant`     |
//! | `thread` |                                | named `std::thread`s     |

pub mod sim;
pub mod thread;
pub mod time;
