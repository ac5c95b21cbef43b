//! Periodic sensor poll scheduler.
//!
//! Fires moisture and light polls at fixed intervals. The scheduler only
//! decides *when*; the [`SchedulerDelegate`] performs the read and
//! reports whether it ran or was skipped because a read was in flight.
//!
//! ```text
//!  ┌───────────────────────────────────────────────────┐
//!  │  tick(now_ms)                                     │
//!  │    for each enabled slot with next_due <= now:    │
//!  │      outcome = delegate.on_poll_due(target)       │
//!  │      Ran     → next_due = now + interval          │
//!  │      Skipped → next_due = now + busy_retry        │
//!  └───────────────────────────────────────────────────┘
//! ```
//!
//! New schedules are due immediately, so the first tick after startup
//! populates the display.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info};

use crate::adapters::thread::spawn_named;
use crate::app::controller::Controller;
use crate::app::ports::{Clock, PollTarget, SchedulerDelegate, TickOutcome};
use crate::config::SchedulerConfig;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single periodic poll.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label (e.g., "moisture").
    pub label: &'static str,
    pub target: PollTarget,
    pub interval_ms: u64,
    /// Delay before retrying a poll that was skipped.
    pub busy_retry_ms: u64,
    pub enabled: bool,
}

/// Maximum number of schedules (stack-allocated).
const MAX_SCHEDULES: usize = 4;

#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    next_due_ms: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
    enabled: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
            enabled: true,
        }
    }

    /// The standard moisture and light polls.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let mut sched = Self::new();
        sched.add(Schedule {
            label: "moisture",
            target: PollTarget::Moisture,
            interval_ms: config.moisture_interval_ms,
            busy_retry_ms: config.moisture_busy_retry_ms,
            enabled: true,
        });
        sched.add(Schedule {
            label: "light",
            target: PollTarget::Light,
            interval_ms: config.light_interval_ms,
            busy_retry_ms: config.light_busy_retry_ms,
            enabled: config.light_interval_ms > 0,
        });
        sched
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        let (i, slot) = self
            .schedules
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())?;
        info!(
            "Scheduler: added '{}' every {}ms at slot {}",
            schedule.label, schedule.interval_ms, i
        );
        *slot = Some(ScheduleEntry {
            schedule,
            next_due_ms: 0,
        });
        Some(i)
    }

    /// Remove a schedule by slot index.
    pub fn remove(&mut self, slot: usize) {
        if let Some(entry) = self.schedules.get_mut(slot) {
            if let Some(e) = entry.take() {
                info!("Scheduler: removed '{}' from slot {}", e.schedule.label, slot);
            }
        }
    }

    /// Enable or disable the entire scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Fire every due schedule.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        if !self.enabled {
            return;
        }

        for entry in self.schedules.iter_mut().flatten() {
            if !entry.schedule.enabled || now_ms < entry.next_due_ms {
                continue;
            }
            let outcome = delegate.on_poll_due(entry.schedule.label, entry.schedule.target);
            entry.next_due_ms = match outcome {
                TickOutcome::Ran => now_ms + entry.schedule.interval_ms,
                TickOutcome::Skipped => {
                    debug!(
                        "Scheduler: '{}' busy, retry in {}ms",
                        entry.schedule.label, entry.schedule.busy_retry_ms
                    );
                    now_ms + entry.schedule.busy_retry_ms
                }
            };
        }
    }

    /// Number of active (enabled) schedules.
    pub fn active_count(&self) -> usize {
        self.schedules
            .iter()
            .flatten()
            .filter(|e| e.schedule.enabled)
            .count()
    }

    /// Run the polling loop on its own thread, ticking every `tick_ms`.
    pub fn spawn(
        mut self,
        controller: Arc<Controller>,
        clock: Arc<dyn Clock>,
        tick_ms: u64,
    ) -> std::io::Result<JoinHandle<()>> {
        spawn_named("scheduler", 64, move || {
            let mut delegate = ControllerDelegate(controller);
            loop {
                self.tick(clock.now_ms(), &mut delegate);
                std::thread::sleep(Duration::from_millis(tick_ms));
            }
        })
    }
}

/// Routes poll targets to the controller.
struct ControllerDelegate(Arc<Controller>);

impl SchedulerDelegate for ControllerDelegate {
    fn on_poll_due(&mut self, _label: &str, target: PollTarget) -> TickOutcome {
        match target {
            PollTarget::Moisture => self.0.poll_moisture(),
            PollTarget::Light => self.0.poll_light(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
