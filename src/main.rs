//! Plantwacht: entry point.
//!
//! Wires the simulated garden into the real controller stack.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │  SimSoilAdc → MoistureSensor   SimVisitor   SimPwm → Servo   │
//! │  SimLight                      SimPin ×3 → MoistureLeds      │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │  Controller · HysteresisClassifier · StateStore       │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! │                                                              │
//! │  Threads: scheduler · wake · valve · console-ui · input      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use plantwacht::adapters::sim::{SimLight, SimPin, SimPwm, SimSoilAdc, SimVisitor, StdDelay};
use plantwacht::adapters::time::MonotonicClock;
use plantwacht::app::controller::Controller;
use plantwacht::app::ports::Clock;
use plantwacht::app::state::AppState;
use plantwacht::app::store::StateStore;
use plantwacht::config::{self, ConfigError, PlantConfig};
use plantwacht::drivers::servo::ServoValve;
use plantwacht::drivers::status_led::MoistureLeds;
use plantwacht::scheduler::Scheduler;
use plantwacht::sensors::moisture::MoistureSensor;
use plantwacht::ui::console::{self, ConsoleRenderer};
use plantwacht::ui::leds::attach_led_indicator;
use plantwacht::ui::view::IconSet;
use plantwacht::valve::ValveWorker;
use plantwacht::wake::WakeMonitor;

const DEFAULT_CONFIG_PATH: &str = "plantwacht.json";

fn load_config() -> Result<PlantConfig> {
    let path = env::var("PLANTWACHT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match config::load(&path) {
        Ok(cfg) => {
            info!("Config loaded from {}", path);
            Ok(cfg)
        }
        Err(ConfigError::NotFound) => {
            warn!("No config at {}, using defaults", path);
            Ok(PlantConfig::default())
        }
        Err(e) => Err(anyhow!("config {path}: {e}")),
    }
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Plantwacht v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let cfg = load_config()?;
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());

    // ── 3. Valve worker + store ───────────────────────────────
    let servo = ServoValve::new(SimPwm::default(), StdDelay, cfg.valve.clone());
    let (valve_worker, valve) = ValveWorker::new(servo);
    let store = Arc::new(StateStore::new(AppState::new(valve_worker.status())));

    let leds = MoistureLeds::new(SimPin::new("led-red"), SimPin::new("led-yellow"), SimPin::new("led-green"))
        .map_err(|e| anyhow!("status LEDs: {e}"))?;
    attach_led_indicator(&store, leds);

    // ── 4. Controller ─────────────────────────────────────────
    let soil = SimSoilAdc::new(&cfg.moisture, Duration::from_secs(90));
    let controller = Arc::new(Controller::new(
        &cfg,
        Arc::clone(&store),
        Box::new(MoistureSensor::new(soil, &cfg.moisture)),
        Box::new(SimLight::new(Duration::from_secs(240))),
        valve,
        Arc::clone(&clock),
    ));

    // ── 5. Threads ────────────────────────────────────────────
    let icon_dir = env::var_os("PLANTWACHT_ICONS").map_or_else(|| PathBuf::from("icons"), PathBuf::from);
    ConsoleRenderer::new(
        Arc::clone(&store),
        cfg.ui.clone(),
        IconSet::load(&icon_dir),
        io::stdout(),
    )
    .spawn()
    .context("spawn console renderer")?;

    valve_worker
        .spawn(Arc::clone(&store))
        .context("spawn valve worker")?;

    WakeMonitor::new(cfg.wake.clone())
        .spawn(
            Box::new(SimVisitor::new(Duration::from_secs(20), Duration::from_secs(40))),
            Arc::clone(&controller),
        )
        .context("spawn wake monitor")?;

    Scheduler::from_config(&cfg.scheduler)
        .spawn(Arc::clone(&controller), Arc::clone(&clock), cfg.scheduler.tick_ms)
        .context("spawn scheduler")?;

    // ── 6. Console input (runs until stdin closes) ────────────
    info!("Type: menu | moisture | light | water | dashboard | refresh | open | close | tap X Y");
    let input = console::spawn_input(io::BufReader::new(io::stdin()), controller, clock, &cfg.ui)
        .context("spawn console input")?;
    input
        .join()
        .map_err(|_| anyhow!("console input thread panicked"))?;

    info!("Input closed, shutting down");
    Ok(())
}
