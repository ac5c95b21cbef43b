//! Moisture LED observer.
//!
//! Mirrors the classified moisture level onto the three status LEDs
//! whenever the store notifies. Pin writes only happen on a level change.

use std::sync::{Arc, Mutex};

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::store::{StateStore, lock};
use crate::drivers::status_led::MoistureLeds;

/// Subscribe `leds` to `store`.
pub fn attach_led_indicator<R, Y, G>(store: &Arc<StateStore>, leds: MoistureLeds<R, Y, G>)
where
    R: OutputPin + Send + 'static,
    Y: OutputPin + Send + 'static,
    G: OutputPin + Send + 'static,
{
    let weak = Arc::downgrade(store);
    let leds = Mutex::new(leds);
    store.subscribe(move || {
        let Some(store) = weak.upgrade() else {
            return;
        };
        let level = store.snapshot().moisture_level;
        let mut leds = lock(&leds);
        if leds.current() == level {
            return;
        }
        if let Err(e) = leds.show(level) {
            warn!("Status LEDs: {}", e);
        }
    });
}
