//! Proximity wake/sleep monitor.
//!
//! Turns a noisy distance stream into a debounced awake/asleep flag:
//!
//! 1. Invalid samples (missing, non-finite, outside the plausible range)
//!    are dropped without touching the counters.
//! 2. Valid samples enter a moving-average window of the last N values.
//! 3. While awake, `filtered > threshold + hysteresis` must hold for
//!    `off_confirm` consecutive samples to fall asleep.
//! 4. While asleep, `filtered <= threshold` must hold for `on_confirm`
//!    consecutive samples to wake.
//!
//! The monitor starts awake.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use heapless::Deque;
use log::{debug, info};

use crate::adapters::thread::spawn_named;
use crate::app::controller::Controller;
use crate::app::ports::RangingPort;
use crate::app::state::WakeState;
use crate::config::{MAX_FILTER_WINDOW, WakeConfig};

pub struct WakeMonitor {
    config: WakeConfig,
    window: Deque<f32, MAX_FILTER_WINDOW>,
    state: WakeState,
    near_hits: u8,
    far_hits: u8,
}

impl WakeMonitor {
    pub fn new(config: WakeConfig) -> Self {
        Self {
            config,
            window: Deque::new(),
            state: WakeState::Awake,
            near_hits: 0,
            far_hits: 0,
        }
    }

    pub fn state(&self) -> WakeState {
        self.state
    }

    /// Moving average of the current window, if any valid sample arrived.
    pub fn filtered_cm(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let sum: f32 = self.window.iter().sum();
        Some(sum / self.window.len() as f32)
    }

    fn is_valid(&self, cm: f32) -> bool {
        cm.is_finite() && cm >= self.config.valid_min_cm && cm <= self.config.valid_max_cm
    }

    /// Feed one sample. Returns the new state when a transition happens.
    pub fn push(&mut self, sample: Option<f32>) -> Option<WakeState> {
        let cm = sample.filter(|&cm| self.is_valid(cm))?;

        let cap = self.config.filter_window.clamp(1, MAX_FILTER_WINDOW);
        while self.window.len() >= cap {
            self.window.pop_front();
        }
        // Cannot fail: the loop above made room.
        let _ = self.window.push_back(cm);
        let filtered = self.filtered_cm()?;

        match self.state {
            WakeState::Awake => {
                if filtered > self.config.threshold_cm + self.config.hysteresis_cm {
                    self.far_hits = self.far_hits.saturating_add(1);
                } else {
                    self.far_hits = 0;
                }
                if self.far_hits >= self.config.off_confirm {
                    return Some(self.transition(WakeState::Asleep, filtered));
                }
            }
            WakeState::Asleep => {
                if filtered <= self.config.threshold_cm {
                    self.near_hits = self.near_hits.saturating_add(1);
                } else {
                    self.near_hits = 0;
                }
                if self.near_hits >= self.config.on_confirm {
                    return Some(self.transition(WakeState::Awake, filtered));
                }
            }
        }
        None
    }

    fn transition(&mut self, next: WakeState, filtered: f32) -> WakeState {
        info!("Wake: {:?} -> {:?} at {:.1}cm", self.state, next, filtered);
        self.state = next;
        self.near_hits = 0;
        self.far_hits = 0;
        next
    }

    /// Poll `ranging` at the configured rate and drive the controller's
    /// wake flag. Publishes "awake" once at start.
    pub fn spawn(
        mut self,
        mut ranging: Box<dyn RangingPort>,
        controller: Arc<Controller>,
    ) -> std::io::Result<JoinHandle<()>> {
        let period = Duration::from_millis(self.config.poll_period_ms());
        spawn_named("wake", 32, move || {
            controller.set_awake(true);
            loop {
                let sample = match ranging.read_distance_cm() {
                    Ok(cm) => Some(cm),
                    Err(e) => {
                        debug!("Ranging: {}", e);
                        None
                    }
                };
                if let Some(state) = self.push(sample) {
                    controller.set_awake(state == WakeState::Awake);
                }
                std::thread::sleep(period);
            }
        })
    }
}
