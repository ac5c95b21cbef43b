//! Plantwacht plant-care controller library.
//!
//! Moisture classification, the shared state store and its observers,
//! the sensor poll scheduler, the proximity wake monitor and the valve
//! worker. Hardware is reached only through the port traits in
//! [`app::ports`] and the `embedded-hal` traits, so everything here runs
//! on a host against mocks or the simulator in [`adapters::sim`].

#![deny(unused_must_use)]

pub mod app;
pub mod classifier;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod valve;
pub mod wake;

pub mod adapters;
pub mod drivers;
pub mod sensors;
pub mod ui;
