//! Controller: the single entry point renderers and loops mutate state through.
//!
//! ```text
//!  Renderers ──intent──▶ ┌──────────────────────┐ ──update──▶ StateStore
//!  Scheduler ──poll────▶ │      Controller      │
//!  WakeMonitor ─awake──▶ │ sensors · classifier │ ──submit──▶ ValveWorker
//!                        └──────────────────────┘
//! ```
//!
//! Sensor reads happen outside the store lock. Each sensor sits behind
//! its own mutex: periodic polls `try_lock` and skip when a read is
//! already in flight, forced refreshes wait for it.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use log::{debug, info, warn};

use crate::classifier::HysteresisClassifier;
use crate::config::PlantConfig;
use crate::valve::{ValveCommand, ValveHandle};

use super::commands::UiIntent;
use super::ports::{Clock, LightPort, MoisturePort, TickOutcome};
use super::state::{AppState, Screen};
use super::store::{StateStore, lock};

/// Text shown when the valve queue rejects a request.
pub const VALVE_BUSY_TEXT: &str = "Valve busy, request dropped.";

/// Whether a read was requested by the user or by a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    Forced,
    Periodic,
}

pub struct Controller {
    store: Arc<StateStore>,
    moisture: Mutex<Box<dyn MoisturePort>>,
    light: Mutex<Box<dyn LightPort>>,
    classifier: Mutex<HysteresisClassifier>,
    valve: ValveHandle,
    clock: Arc<dyn Clock>,
    /// Minimum raw change that is worth a notification.
    notify_raw_delta: i32,
}

impl Controller {
    pub fn new(
        config: &PlantConfig,
        store: Arc<StateStore>,
        moisture: Box<dyn MoisturePort>,
        light: Box<dyn LightPort>,
        valve: ValveHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            moisture: Mutex::new(moisture),
            light: Mutex::new(light),
            classifier: Mutex::new(HysteresisClassifier::from_config(&config.moisture)),
            valve,
            clock,
            notify_raw_delta: config.moisture.notify_raw_delta,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn snapshot(&self) -> AppState {
        self.store.snapshot()
    }

    // ── Navigation ────────────────────────────────────────────

    /// Switch screens. Entering a reading screen forces a fresh read
    /// before observers are notified; entering the water screen asks
    /// the valve worker to re-publish its status.
    pub fn goto(&self, screen: Screen) {
        info!("UI: goto {}", screen);
        match screen {
            Screen::Moisture | Screen::Dashboard => {
                let moved = self.set_screen_silently(screen);
                self.refresh_moisture_with(Refresh::Forced, moved);
                if screen == Screen::Dashboard {
                    self.refresh_light_with(Refresh::Periodic, false);
                }
            }
            Screen::Light => {
                let moved = self.set_screen_silently(screen);
                self.refresh_light_with(Refresh::Forced, moved);
            }
            Screen::Water => {
                self.store.update_if_changed(|s| s.screen = screen);
                self.submit_valve(ValveCommand::Status);
            }
            Screen::Menu => {
                self.store.update_if_changed(|s| s.screen = screen);
            }
        }
    }

    /// Record the screen without notifying; the refresh that follows
    /// publishes it. Returns whether the screen changed.
    fn set_screen_silently(&self, screen: Screen) -> bool {
        let mut moved = false;
        self.store.update(|s| {
            moved = s.screen != screen;
            s.screen = screen;
            false
        });
        moved
    }

    /// Apply a renderer intent.
    pub fn dispatch(&self, intent: UiIntent) {
        match intent {
            UiIntent::Goto(screen) => self.goto(screen),
            UiIntent::Refresh => self.refresh_current(),
            UiIntent::OpenValve => self.open_valve_async(),
            UiIntent::CloseValve => self.close_valve_async(),
        }
    }

    // ── Sensor refresh ────────────────────────────────────────

    /// Forced moisture read; notifies if the reading changed anything.
    pub fn refresh_moisture(&self) {
        self.refresh_moisture_with(Refresh::Forced, false);
    }

    /// Forced light read; notifies if the value changed.
    pub fn refresh_light(&self) {
        self.refresh_light_with(Refresh::Forced, false);
    }

    /// Force-refresh whatever the current screen displays.
    pub fn refresh_current(&self) {
        match self.store.snapshot().screen {
            Screen::Moisture => self.refresh_moisture(),
            Screen::Light => self.refresh_light(),
            Screen::Dashboard => {
                self.refresh_moisture();
                self.refresh_light();
            }
            Screen::Water => self.submit_valve(ValveCommand::Status),
            Screen::Menu => {}
        }
    }

    /// Scheduler entry point for the moisture poll.
    pub fn poll_moisture(&self) -> TickOutcome {
        self.refresh_moisture_with(Refresh::Periodic, false)
    }

    /// Scheduler entry point for the light poll.
    pub fn poll_light(&self) -> TickOutcome {
        self.refresh_light_with(Refresh::Periodic, false)
    }

    /// `dirty` marks a change already written silently that this update
    /// must publish even if the reading itself changes nothing.
    fn refresh_moisture_with(&self, mode: Refresh, dirty: bool) -> TickOutcome {
        let Some(mut sensor) = acquire(&self.moisture, mode, "moisture") else {
            return TickOutcome::Skipped;
        };
        let reading = sensor.read_moisture();

        let reading = match reading {
            Ok(r) => r,
            Err(e) => {
                // Keep the last valid pair on screen.
                warn!("Moisture read failed: {}", e);
                if dirty {
                    self.store.update(|_| true);
                }
                return TickOutcome::Ran;
            }
        };

        let level = lock(&self.classifier).classify(Some(reading.raw), self.clock.now_ms());
        let delta = self.notify_raw_delta;
        let notified = self.store.update(|s| {
            let changed = s.moisture_percent != Some(reading.percent)
                || s.moisture_raw != Some(reading.raw)
                || s.moisture_level != level;
            let significant = s.moisture_percent != Some(reading.percent)
                || s.moisture_level != level
                || s.moisture_raw.is_none_or(|prev| (reading.raw - prev).abs() >= delta);
            s.moisture_percent = Some(reading.percent);
            s.moisture_raw = Some(reading.raw);
            s.moisture_level = level;
            dirty
                || match mode {
                    Refresh::Forced => changed,
                    Refresh::Periodic => significant,
                }
        });
        drop(sensor);

        debug!(
            "Moisture: {}% raw={} level={} notified={}",
            reading.percent,
            reading.raw,
            level.label(),
            notified
        );
        TickOutcome::Ran
    }

    fn refresh_light_with(&self, mode: Refresh, dirty: bool) -> TickOutcome {
        let Some(mut sensor) = acquire(&self.light, mode, "light") else {
            return TickOutcome::Skipped;
        };
        let reading = sensor.read_light();
        drop(sensor);

        match reading {
            Ok(value) => {
                self.store.update(|s| {
                    let changed = s.light != Some(value);
                    s.light = Some(value);
                    changed || dirty
                });
            }
            Err(e) => {
                debug!("Light read failed: {}", e);
                if dirty {
                    self.store.update(|_| true);
                }
            }
        }
        TickOutcome::Ran
    }

    // ── Valve ─────────────────────────────────────────────────

    /// Queue an open request; returns immediately.
    pub fn open_valve_async(&self) {
        self.submit_valve(ValveCommand::Open);
    }

    /// Queue a close request; returns immediately.
    pub fn close_valve_async(&self) {
        self.submit_valve(ValveCommand::Close);
    }

    fn submit_valve(&self, cmd: ValveCommand) {
        if self.valve.submit(cmd).is_err() {
            self.store
                .update_if_changed(|s| s.valve_text = VALVE_BUSY_TEXT.to_string());
        }
    }

    // ── Wake ──────────────────────────────────────────────────

    /// Set the UI wake flag; notifies only on change.
    pub fn set_awake(&self, awake: bool) {
        if self.store.update_if_changed(|s| s.ui_awake = awake) {
            info!("UI {}", if awake { "awake" } else { "asleep" });
        }
    }
}

/// Lock a sensor according to the refresh mode. `None` means a periodic
/// poll found a read already in flight.
fn acquire<'a, T: ?Sized>(
    sensor: &'a Mutex<Box<T>>,
    mode: Refresh,
    name: &str,
) -> Option<MutexGuard<'a, Box<T>>> {
    match mode {
        Refresh::Forced => Some(lock(sensor)),
        Refresh::Periodic => match sensor.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
            Err(TryLockError::WouldBlock) => {
                debug!("{} read in flight, poll skipped", name);
                None
            }
        },
    }
}
