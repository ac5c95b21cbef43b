//! Mock hardware adapters for integration tests.
//!
//! Sensors replay scripted readings, the valve records every call, and
//! the clock only moves when a test advances it.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use embedded_hal::digital::{ErrorType, OutputPin};
use plantwacht::app::controller::Controller;
use plantwacht::app::ports::{
    Clock, LightPort, MoisturePort, MoistureReading, RangingPort, ValvePort,
};
use plantwacht::app::state::AppState;
use plantwacht::app::store::StateStore;
use plantwacht::config::PlantConfig;
use plantwacht::error::{Result, SensorError};
use plantwacht::valve::{ValveHandle, ValveWorker};

// ── Clock ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ── Moisture ──────────────────────────────────────────────────

type Scripted = core::result::Result<MoistureReading, SensorError>;

/// Replays queued readings; repeats the last one once the queue is empty.
#[derive(Clone, Default)]
pub struct MoistureScript {
    queue: Arc<Mutex<VecDeque<Scripted>>>,
    reads: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MoistureScript {
    pub fn push(&self, percent: u8, raw: i32) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(MoistureReading { percent, raw }));
    }

    pub fn push_err(&self, err: SensorError) {
        self.queue.lock().unwrap().push_back(Err(err));
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

pub struct MockMoisture {
    script: MoistureScript,
    last: Scripted,
    /// One-shot gate: announce the read, then wait for a release.
    gate: Option<(Sender<()>, Receiver<()>)>,
}

#[allow(dead_code)]
impl MockMoisture {
    pub fn new(script: MoistureScript) -> Self {
        Self {
            script,
            last: Err(SensorError::Unavailable),
            gate: None,
        }
    }

    pub fn gated(script: MoistureScript, entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            gate: Some((entered, release)),
            ..Self::new(script)
        }
    }
}

impl MoisturePort for MockMoisture {
    fn read_moisture(&mut self) -> core::result::Result<MoistureReading, SensorError> {
        self.script.reads.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = self.gate.take() {
            let _ = entered.send(());
            let _ = release.recv();
        }
        if let Some(next) = self.script.queue.lock().unwrap().pop_front() {
            self.last = next;
        }
        self.last
    }
}

// ── Light ─────────────────────────────────────────────────────

pub struct MockLight {
    pub value: core::result::Result<f32, SensorError>,
}

impl LightPort for MockLight {
    fn read_light(&mut self) -> core::result::Result<f32, SensorError> {
        self.value
    }
}

// ── Ranging ───────────────────────────────────────────────────

/// Always reports the same distance.
pub struct FixedRange(pub f32);

impl RangingPort for FixedRange {
    fn read_distance_cm(&mut self) -> core::result::Result<f32, SensorError> {
        Ok(self.0)
    }
}

// ── Valve ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveCall {
    Open,
    Close,
}

/// Shared view of what a [`MockValve`] did.
#[derive(Clone, Default)]
pub struct ValveLog {
    pub calls: Arc<Mutex<Vec<ValveCall>>>,
    active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ValveLog {
    pub fn calls(&self) -> Vec<ValveCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// Valve that takes `travel` per move and records overlapping calls.
pub struct MockValve {
    log: ValveLog,
    travel: Duration,
    open: bool,
}

impl MockValve {
    pub fn new(log: ValveLog, travel: Duration) -> Self {
        Self {
            log,
            travel,
            open: false,
        }
    }

    fn do_move(&mut self, call: ValveCall) -> String {
        let now_active = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_active.fetch_max(now_active, Ordering::SeqCst);
        std::thread::sleep(self.travel);
        self.log.calls.lock().unwrap().push(call);
        self.log.active.fetch_sub(1, Ordering::SeqCst);
        self.open = call == ValveCall::Open;
        self.valve_status()
    }
}

impl ValvePort for MockValve {
    fn open_valve(&mut self) -> Result<String> {
        Ok(self.do_move(ValveCall::Open))
    }

    fn close_valve(&mut self) -> Result<String> {
        Ok(self.do_move(ValveCall::Close))
    }

    fn valve_status(&self) -> String {
        let text = if self.open { "mock: open" } else { "mock: closed" };
        text.to_string()
    }
}

// ── GPIO ──────────────────────────────────────────────────────

/// Output pin whose level is readable from the test.
#[derive(Clone, Default)]
pub struct MockPin {
    pub high: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::SeqCst)
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.high.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.high.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A controller wired to mocks, plus handles to drive them.
pub struct Rig {
    pub store: Arc<StateStore>,
    pub controller: Arc<Controller>,
    pub clock: Arc<ManualClock>,
    pub script: MoistureScript,
    pub notifications: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> (Self, ValveWorker<MockValve>, ValveLog) {
        let script = MoistureScript::default();
        Self::with_moisture(MockMoisture::new(script.clone()), script)
    }

    pub fn with_moisture(
        moisture: MockMoisture,
        script: MoistureScript,
    ) -> (Self, ValveWorker<MockValve>, ValveLog) {
        let log = ValveLog::default();
        let (worker, handle) = ValveWorker::new(MockValve::new(log.clone(), Duration::from_millis(20)));
        let rig = Self::assemble(moisture, script, handle, worker.status());
        (rig, worker, log)
    }

    fn assemble(moisture: MockMoisture, script: MoistureScript, valve: ValveHandle, status: String) -> Self {
        let store = Arc::new(StateStore::new(AppState::new(status)));
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let clock = Arc::new(ManualClock::default());
        let controller = Arc::new(Controller::new(
            &PlantConfig::default(),
            Arc::clone(&store),
            Box::new(moisture),
            Box::new(MockLight { value: Ok(321.5) }),
            valve,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        Self {
            store,
            controller,
            clock,
            script,
            notifications,
        }
    }

    pub fn notified(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }
}

/// Poll `cond` until it holds or `timeout` passes.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
