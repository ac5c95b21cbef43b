//! Controller behaviour against mock sensors and a manual clock.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use plantwacht::app::commands::UiIntent;
use plantwacht::app::controller::VALVE_BUSY_TEXT;
use plantwacht::app::ports::TickOutcome;
use plantwacht::app::state::Screen;
use plantwacht::classifier::MoistureLevel;
use plantwacht::error::SensorError;
use plantwacht::valve::VALVE_QUEUE_DEPTH;

use crate::mock_hw::{MockMoisture, MoistureScript, Rig};

// ── Navigation ────────────────────────────────────────────────

#[test]
fn goto_moisture_reads_before_notifying_once() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(62, 5000);

    rig.controller.goto(Screen::Moisture);

    let st = rig.controller.snapshot();
    assert_eq!(st.screen, Screen::Moisture);
    assert_eq!(st.moisture_percent, Some(62));
    assert_eq!(st.moisture_raw, Some(5000));
    assert_eq!(st.moisture_level, MoistureLevel::Moist);
    assert_eq!(rig.notified(), 1);
}

#[test]
fn goto_light_reads_light() {
    let (rig, _worker, _) = Rig::new();
    rig.controller.goto(Screen::Light);

    let st = rig.controller.snapshot();
    assert_eq!(st.screen, Screen::Light);
    assert_eq!(st.light, Some(321.5));
    assert_eq!(rig.script.reads(), 0);
    assert_eq!(rig.notified(), 1);
}

#[test]
fn goto_dashboard_reads_both_sensors() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(40, 4950);
    rig.controller.goto(Screen::Dashboard);

    let st = rig.controller.snapshot();
    assert_eq!(st.moisture_percent, Some(40));
    assert_eq!(st.light, Some(321.5));
}

#[test]
fn goto_water_touches_no_sensor() {
    let (rig, _worker, _) = Rig::new();
    rig.controller.goto(Screen::Water);
    rig.controller.goto(Screen::Water);

    assert_eq!(rig.controller.snapshot().screen, Screen::Water);
    assert_eq!(rig.script.reads(), 0);
    // Second goto changed nothing.
    assert_eq!(rig.notified(), 1);
}

#[test]
fn refresh_on_menu_is_silent() {
    let (rig, _worker, _) = Rig::new();
    rig.controller.dispatch(UiIntent::Refresh);
    assert_eq!(rig.script.reads(), 0);
    assert_eq!(rig.notified(), 0);
}

#[test]
fn refresh_on_water_only_queues_a_status_read() {
    // No worker: the request just sits in the queue.
    let (rig, _worker, log) = Rig::new();
    rig.controller.goto(Screen::Water);
    assert_eq!(rig.notified(), 1);

    rig.controller.refresh_current();
    assert_eq!(rig.notified(), 1);
    assert_eq!(rig.controller.snapshot().valve_text, "mock: closed");
    assert!(log.calls().is_empty());
}

#[test]
fn goto_moisture_publishes_screen_even_if_reading_unchanged() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(62, 5000);
    rig.controller.refresh_moisture();
    assert_eq!(rig.notified(), 1);

    rig.controller.goto(Screen::Moisture);
    assert_eq!(rig.controller.snapshot().screen, Screen::Moisture);
    assert_eq!(rig.notified(), 2);
}

#[test]
fn parsed_words_dispatch() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(70, 5200);
    rig.controller.dispatch("dashboard".parse().unwrap());
    assert_eq!(rig.controller.snapshot().screen, Screen::Dashboard);
    rig.controller.dispatch("back".parse().unwrap());
    assert_eq!(rig.controller.snapshot().screen, Screen::Menu);
}

// ── Moisture refresh ──────────────────────────────────────────

#[test]
fn failed_forced_read_keeps_last_pair() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(62, 5000);
    rig.script.push_err(SensorError::AdcReadFailed);

    rig.controller.refresh_moisture();
    assert_eq!(rig.notified(), 1);
    rig.controller.refresh_moisture();

    let st = rig.controller.snapshot();
    assert_eq!(st.moisture_percent, Some(62));
    assert_eq!(st.moisture_raw, Some(5000));
    assert_eq!(st.moisture_level, MoistureLevel::Moist);
    // Nothing changed, so nobody redraws.
    assert_eq!(rig.notified(), 1);
}

#[test]
fn failed_first_read_is_silent() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push_err(SensorError::AdcReadFailed);

    rig.controller.refresh_moisture();
    assert_eq!(rig.script.reads(), 1);
    assert_eq!(rig.controller.snapshot().moisture_percent, None);
    assert_eq!(rig.notified(), 0);
}

#[test]
fn failed_read_on_screen_switch_still_publishes_the_screen() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push_err(SensorError::AdcReadFailed);

    rig.controller.goto(Screen::Moisture);
    assert_eq!(rig.controller.snapshot().screen, Screen::Moisture);
    assert_eq!(rig.notified(), 1);
}

#[test]
fn unchanged_forced_read_is_silent() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(62, 5000);

    rig.controller.refresh_moisture();
    rig.controller.refresh_moisture();
    assert_eq!(rig.script.reads(), 2);
    assert_eq!(rig.notified(), 1);
}

#[test]
fn failed_periodic_poll_is_silent() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push_err(SensorError::BusError);

    assert_eq!(rig.controller.poll_moisture(), TickOutcome::Ran);
    assert_eq!(rig.controller.snapshot().moisture_percent, None);
    assert_eq!(rig.notified(), 0);
}

#[test]
fn periodic_poll_ignores_small_raw_drift() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(80, 5200);
    rig.script.push(80, 5220);
    rig.script.push(80, 5270);

    rig.controller.poll_moisture();
    assert_eq!(rig.notified(), 1);

    rig.controller.poll_moisture();
    assert_eq!(rig.notified(), 1);
    // The stored pair still tracks the latest read.
    assert_eq!(rig.controller.snapshot().moisture_raw, Some(5220));

    rig.controller.poll_moisture();
    assert_eq!(rig.notified(), 2);
}

#[test]
fn periodic_poll_notifies_on_percent_change() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(80, 5200);
    rig.script.push(81, 5205);

    rig.controller.poll_moisture();
    rig.controller.poll_moisture();
    assert_eq!(rig.notified(), 2);
}

#[test]
fn level_steps_one_zone_at_a_time() {
    let (rig, _worker, _) = Rig::new();
    rig.script.push(5, 4800);
    rig.script.push(95, 5300);

    rig.controller.refresh_moisture();
    assert_eq!(rig.controller.snapshot().moisture_level, MoistureLevel::Dry);

    // Inside the hold time nothing moves.
    rig.clock.advance(100);
    rig.controller.refresh_moisture();
    assert_eq!(rig.controller.snapshot().moisture_level, MoistureLevel::Dry);

    rig.clock.advance(400);
    rig.controller.refresh_moisture();
    assert_eq!(rig.controller.snapshot().moisture_level, MoistureLevel::Moist);

    rig.clock.advance(400);
    rig.controller.refresh_moisture();
    assert_eq!(rig.controller.snapshot().moisture_level, MoistureLevel::Wet);
}

#[test]
fn poll_skipped_while_forced_read_in_flight() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let script = MoistureScript::default();
    script.push(50, 4939);
    let (rig, _worker, _) =
        Rig::with_moisture(MockMoisture::gated(script.clone(), entered_tx, release_rx), script);

    let controller = Arc::clone(&rig.controller);
    let forced = thread::spawn(move || controller.refresh_moisture());
    entered_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("forced read never started");

    assert_eq!(rig.controller.poll_moisture(), TickOutcome::Skipped);
    // Light has its own lock.
    assert_eq!(rig.controller.poll_light(), TickOutcome::Ran);

    release_tx.send(()).unwrap();
    forced.join().unwrap();

    assert_eq!(rig.controller.poll_moisture(), TickOutcome::Ran);
    assert_eq!(rig.script.reads(), 2);
    assert_eq!(rig.controller.snapshot().moisture_percent, Some(50));
}

// ── Wake ──────────────────────────────────────────────────────

#[test]
fn set_awake_notifies_on_change_only() {
    let (rig, _worker, _) = Rig::new();
    rig.controller.set_awake(true);
    assert_eq!(rig.notified(), 0);

    rig.controller.set_awake(false);
    rig.controller.set_awake(false);
    assert_eq!(rig.notified(), 1);
    assert!(!rig.controller.snapshot().ui_awake);

    rig.controller.set_awake(true);
    assert_eq!(rig.notified(), 2);
}

// ── Valve queue ───────────────────────────────────────────────

#[test]
fn full_valve_queue_reports_busy() {
    // Worker never started: nothing drains the queue.
    let (rig, _worker, log) = Rig::new();
    for _ in 0..VALVE_QUEUE_DEPTH {
        rig.controller.open_valve_async();
    }
    assert_eq!(rig.notified(), 0);
    assert_eq!(rig.controller.snapshot().valve_text, "mock: closed");

    rig.controller.close_valve_async();
    assert_eq!(rig.controller.snapshot().valve_text, VALVE_BUSY_TEXT);
    assert_eq!(rig.notified(), 1);
    assert!(log.calls().is_empty());
}
