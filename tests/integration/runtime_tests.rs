//! Background threads wired to the controller: valve worker, wake
//! monitor, scheduler, LED observer and the console front end.

use std::io::{self, Write};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plantwacht::app::commands::UiIntent;
use plantwacht::app::controller::VALVE_BUSY_TEXT;
use plantwacht::app::ports::Clock;
use plantwacht::app::state::Screen;
use plantwacht::config::{SchedulerConfig, UiConfig, WakeConfig};
use plantwacht::drivers::status_led::MoistureLeds;
use plantwacht::scheduler::Scheduler;
use plantwacht::ui::console::{ConsoleRenderer, LineOutcome, handle_line};
use plantwacht::ui::leds::attach_led_indicator;
use plantwacht::ui::touch::TouchPanel;
use plantwacht::ui::view::IconSet;
use plantwacht::valve::VALVE_QUEUE_DEPTH;
use plantwacht::wake::WakeMonitor;

use crate::mock_hw::{FixedRange, MockPin, Rig, ValveCall, wait_until};

const DEADLINE: Duration = Duration::from_secs(3);

// ── Valve worker ──────────────────────────────────────────────

#[test]
fn valve_requests_execute_in_order_one_at_a_time() {
    let (rig, worker, log) = Rig::new();
    worker.spawn(Arc::clone(&rig.store)).unwrap();

    rig.controller.open_valve_async();
    rig.controller.close_valve_async();
    rig.controller.open_valve_async();

    assert!(wait_until(DEADLINE, || log.calls().len() == 3));
    assert_eq!(log.calls(), vec![ValveCall::Open, ValveCall::Close, ValveCall::Open]);
    assert_eq!(log.max_active.load(Ordering::SeqCst), 1);
    assert!(wait_until(DEADLINE, || rig.controller.snapshot().valve_text == "mock: open"));
}

#[test]
fn water_screen_buttons_reach_the_valve() {
    let (rig, worker, log) = Rig::new();
    worker.spawn(Arc::clone(&rig.store)).unwrap();

    rig.controller.dispatch(UiIntent::Goto(Screen::Water));
    rig.controller.dispatch(UiIntent::OpenValve);
    assert!(wait_until(DEADLINE, || log.calls() == vec![ValveCall::Open]));
    assert!(wait_until(DEADLINE, || rig.controller.snapshot().valve_text == "mock: open"));
}

#[test]
fn entering_water_screen_republishes_valve_status() {
    let (rig, worker, log) = Rig::new();
    rig.store
        .update_if_changed(|s| s.valve_text = VALVE_BUSY_TEXT.to_string());
    worker.spawn(Arc::clone(&rig.store)).unwrap();

    rig.controller.goto(Screen::Water);
    assert!(wait_until(DEADLINE, || rig.controller.snapshot().valve_text == "mock: closed"));
    // A status read never moves the valve.
    assert!(log.calls().is_empty());
}

#[test]
fn entering_water_screen_with_full_queue_reports_busy() {
    // Worker never started: nothing drains the queue.
    let (rig, _worker, log) = Rig::new();
    for _ in 0..VALVE_QUEUE_DEPTH {
        rig.controller.open_valve_async();
    }

    rig.controller.goto(Screen::Water);
    let st = rig.controller.snapshot();
    assert_eq!(st.screen, Screen::Water);
    assert_eq!(st.valve_text, VALVE_BUSY_TEXT);
    assert!(log.calls().is_empty());
}

// ── Wake monitor ──────────────────────────────────────────────

#[test]
fn nobody_near_puts_the_ui_to_sleep() {
    let (rig, _worker, _) = Rig::new();
    let cfg = WakeConfig {
        poll_hz: 100,
        ..WakeConfig::default()
    };
    WakeMonitor::new(cfg)
        .spawn(Box::new(FixedRange(150.0)), Arc::clone(&rig.controller))
        .unwrap();

    assert!(wait_until(DEADLINE, || !rig.controller.snapshot().ui_awake));
}

#[test]
fn someone_near_keeps_the_ui_awake() {
    let (rig, _worker, _) = Rig::new();
    let cfg = WakeConfig {
        poll_hz: 100,
        ..WakeConfig::default()
    };
    rig.controller.set_awake(false);
    WakeMonitor::new(cfg)
        .spawn(Box::new(FixedRange(30.0)), Arc::clone(&rig.controller))
        .unwrap();

    assert!(wait_until(DEADLINE, || rig.controller.snapshot().ui_awake));
    std::thread::sleep(Duration::from_millis(100));
    assert!(rig.controller.snapshot().ui_awake);
}

// ── Scheduler ─────────────────────────────────────────────────

#[test]
fn scheduler_populates_the_display() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(55, 4950);
    let cfg = SchedulerConfig {
        tick_ms: 5,
        ..SchedulerConfig::default()
    };
    Scheduler::from_config(&cfg)
        .spawn(
            Arc::clone(&rig.controller),
            Arc::clone(&rig.clock) as Arc<dyn Clock>,
            cfg.tick_ms,
        )
        .unwrap();

    assert!(wait_until(DEADLINE, || {
        let st = rig.controller.snapshot();
        st.moisture_percent == Some(55) && st.light == Some(321.5)
    }));
    // The clock is frozen, so each poll ran exactly once.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(rig.script.reads(), 1);
}

// ── LED observer ──────────────────────────────────────────────

#[test]
fn leds_follow_the_classified_level() {
    let (rig, _worker, _) = Rig::new();
    let (red, yellow, green) = (MockPin::default(), MockPin::default(), MockPin::default());
    let leds = MoistureLeds::new(red.clone(), yellow.clone(), green.clone()).unwrap();
    attach_led_indicator(&rig.store, leds);

    rig.script.push(5, 4800);
    rig.controller.refresh_moisture();
    assert!(red.is_high() && !yellow.is_high() && !green.is_high());

    rig.script.push(95, 5300);
    rig.clock.advance(400);
    rig.controller.refresh_moisture();
    assert!(!red.is_high() && yellow.is_high() && !green.is_high());

    rig.clock.advance(400);
    rig.controller.refresh_moisture();
    assert!(!red.is_high() && !yellow.is_high() && green.is_high());
}

// ── Console ───────────────────────────────────────────────────

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn console_input_is_dropped_while_asleep() {
    let (rig, _worker, _) = Rig::new();
    let mut panel = TouchPanel::from_config(&UiConfig::default());
    let clock: &dyn Clock = rig.clock.as_ref();

    rig.controller.set_awake(false);
    assert_eq!(
        handle_line(&rig.controller, &mut panel, clock, "water"),
        Ok(LineOutcome::Asleep)
    );
    assert_eq!(rig.controller.snapshot().screen, Screen::Menu);

    rig.controller.set_awake(true);
    assert_eq!(
        handle_line(&rig.controller, &mut panel, clock, "water"),
        Ok(LineOutcome::Dispatched(UiIntent::Goto(Screen::Water)))
    );
    assert_eq!(rig.controller.snapshot().screen, Screen::Water);
    assert!(handle_line(&rig.controller, &mut panel, clock, "flood").is_err());
    assert_eq!(
        handle_line(&rig.controller, &mut panel, clock, "   "),
        Ok(LineOutcome::Ignored)
    );
}

#[test]
fn console_tap_routes_through_the_touch_panel() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(48, 4930);
    let mut panel = TouchPanel::from_config(&UiConfig::default());

    // Menu row one under the default calibration.
    let outcome = handle_line(&rig.controller, &mut panel, rig.clock.as_ref(), "tap 3000 2050");
    assert_eq!(
        outcome,
        Ok(LineOutcome::Dispatched(UiIntent::Goto(Screen::Moisture)))
    );
    assert_eq!(rig.controller.snapshot().moisture_percent, Some(48));
}

#[test]
fn console_renderer_draws_the_current_page() {
    let (rig, _worker, _) = Rig::new();
    let out = SharedBuf::default();
    let mut renderer = ConsoleRenderer::new(
        Arc::clone(&rig.store),
        UiConfig::default(),
        IconSet::default(),
        out.clone(),
    );

    rig.script.push(80, 5200);
    rig.controller.goto(Screen::Moisture);
    assert!(renderer.render_once().unwrap());

    let text = out.text();
    assert!(text.contains("──── Moisture"), "{text}");
    assert!(text.contains("Moisture: 80% (raw 5200)"), "{text}");
    assert!(text.contains("Level: WET"), "{text}");
}
