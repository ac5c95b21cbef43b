//! Single-writer valve worker.
//!
//! Valve moves block for the servo travel time, so renderers never call
//! the driver directly. Requests go into a bounded queue; one worker
//! thread drains it in order and publishes the resulting status text to
//! the store.
//!
//! ```text
//!  Controller ──try_send──▶ [ Channel<ValveCommand, 4> ] ──receive──▶ ValveWorker ──▶ store
//! ```
//!
//! A full queue drops the request; the caller reports it to the user.

use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{error, info, warn};

use crate::adapters::thread::spawn_named;
use crate::app::ports::ValvePort;
use crate::app::store::StateStore;
use crate::error::ActuatorError;

/// Pending requests the queue can hold.
pub const VALVE_QUEUE_DEPTH: usize = 4;

/// Requests accepted by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveCommand {
    Open,
    Close,
    /// Re-publish the current status text.
    Status,
}

type ValveQueue = Channel<CriticalSectionRawMutex, ValveCommand, VALVE_QUEUE_DEPTH>;

/// Cloneable sending side of the valve queue.
#[derive(Clone)]
pub struct ValveHandle {
    queue: Arc<ValveQueue>,
}

impl ValveHandle {
    /// Enqueue a request without blocking.
    pub fn submit(&self, cmd: ValveCommand) -> Result<(), ActuatorError> {
        self.queue.try_send(cmd).map_err(|_| {
            warn!("Valve queue full, dropping {:?}", cmd);
            ActuatorError::QueueFull
        })
    }

    /// Requests waiting to be executed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Owns the valve driver and executes queued requests one at a time.
pub struct ValveWorker<V: ValvePort> {
    valve: V,
    queue: Arc<ValveQueue>,
}

impl<V: ValvePort + 'static> ValveWorker<V> {
    /// Create the worker and the handle used to feed it.
    pub fn new(valve: V) -> (Self, ValveHandle) {
        let queue = Arc::new(Channel::new());
        let handle = ValveHandle {
            queue: Arc::clone(&queue),
        };
        (Self { valve, queue }, handle)
    }

    /// Status text for the initial state record.
    pub fn status(&self) -> String {
        self.valve.valve_status()
    }

    /// Execute one request and return the text to display.
    pub fn execute(&mut self, cmd: ValveCommand) -> String {
        let result = match cmd {
            ValveCommand::Open => self.valve.open_valve(),
            ValveCommand::Close => self.valve.close_valve(),
            ValveCommand::Status => Ok(self.valve.valve_status()),
        };
        match result {
            Ok(text) => {
                info!("Valve {:?}: {}", cmd, text);
                text
            }
            Err(e) => {
                error!("Valve {:?} failed: {}", cmd, e);
                format!("Valve error: {e}")
            }
        }
    }

    /// Drain the queue forever, publishing each result.
    pub fn run(mut self, store: &StateStore) -> ! {
        loop {
            let cmd = futures_lite::future::block_on(self.queue.receive());
            let text = self.execute(cmd);
            store.update_if_changed(|s| s.valve_text = text);
        }
    }

    /// Run the worker on its own thread.
    pub fn spawn(self, store: Arc<StateStore>) -> std::io::Result<JoinHandle<()>> {
        spawn_named("valve", 32, move || {
            self.run(&store);
        })
    }
}
