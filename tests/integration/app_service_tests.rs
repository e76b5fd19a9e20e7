//! Integration tests for the calibrate → sample → decide → display →
//! report pipeline.
//!
//! These run on the host (x86_64) and drive [`AppService`] end to end
//! through mock adapters, without any real hardware.

use crate::mock_hw::{
    CountingWatchdog, LSB_PER_G, MockBoard, MockReporter, NoDelay, RecordingDisplay, RecordingSink,
};

use hazardwatch::alarm::{AlarmReading, AlarmReason};
use hazardwatch::app::events::AppEvent;
use hazardwatch::app::service::AppService;
use hazardwatch::config::SystemConfig;
use hazardwatch::error::CommsError;
use hazardwatch::sensors::channel::{ChannelId, Polarity};

struct Rig {
    app: AppService,
    board: MockBoard,
    display: RecordingDisplay,
    reporter: MockReporter,
    watchdog: CountingWatchdog,
    sink: RecordingSink,
}

impl Rig {
    fn tick(&mut self, now_ms: u64) -> AlarmReading {
        self.app.tick(
            now_ms,
            &mut self.board,
            &mut NoDelay,
            &mut self.display,
            &mut self.reporter,
            &mut self.watchdog,
            &mut self.sink,
        )
    }
}

/// Five 200 ms calibration ticks, 0.5 V margin on every channel.
fn test_config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.calibration.duration_ms = 1_000;
    config.calibration.tick_ms = 200;
    for ch in config.channels.iter_mut() {
        ch.margin_v = 0.5;
    }
    config.seismic.lsb_per_g = LSB_PER_G;
    config
}

/// Calibrate in 1.0 V clean air, then hand back the rig.
fn make_rig(reporter: MockReporter) -> Rig {
    make_rig_with(test_config(), MockBoard::new(1.0), reporter)
}

fn make_rig_with(config: SystemConfig, mut board: MockBoard, reporter: MockReporter) -> Rig {
    let mut display = RecordingDisplay::new();
    let mut sink = RecordingSink::new();
    let app = AppService::start(config, &mut board, &mut NoDelay, &mut display, &mut sink);
    Rig { app, board, display, reporter, watchdog: CountingWatchdog::default(), sink }
}

// ── Calibration ───────────────────────────────────────────────

#[test]
fn calibration_fixes_baselines_and_reports_progress() {
    let rig = make_rig(MockReporter::online());

    for id in [ChannelId::Lpg, ChannelId::Combustible, ChannelId::Co] {
        let b = rig.app.baseline(id).unwrap();
        assert!((b - 1.0).abs() < 0.01, "{id} baseline {b}");
    }

    let progress: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CalibrationProgress { done, total } => Some((*done, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Calibrated { .. })), 3);
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Started { channels: 3 }));

    assert_eq!(rig.display.frames[0][0], "Calibrating...");
    let done = rig.display.last().unwrap();
    assert_eq!(done[0], "Calibration");
    assert_eq!(done[1], "Done");
}

#[test]
fn calibration_does_not_feed_the_watchdog_or_report() {
    let rig = make_rig(MockReporter::online());
    assert_eq!(rig.watchdog.feeds, 0);
    assert!(rig.reporter.sent.is_empty());
    assert_eq!(rig.app.cycle_count(), 0);
}

// ── Gas thresholds ────────────────────────────────────────────

#[test]
fn voltage_below_margin_is_calm_above_margin_alarms() {
    let mut rig = make_rig(MockReporter::online());

    rig.board.set_volts(ChannelId::Lpg, 1.4);
    let calm = rig.tick(0);
    assert!(!calm.alarm);
    assert_eq!(calm.reason, AlarmReason::None);

    rig.board.set_volts(ChannelId::Lpg, 1.6);
    let alarm = rig.tick(100);
    assert!(alarm.alarm && alarm.gas);
    assert_eq!(alarm.reason, AlarmReason::Gas);
    let lpg = alarm.channel(ChannelId::Lpg).unwrap();
    assert!(lpg.over_baseline && !lpg.digital);
    assert!(!alarm.channel(ChannelId::Co).unwrap().alarm);
    assert!(rig.app.alarm_active());
}

#[test]
fn comparator_line_trips_channel_without_voltage_rise() {
    let mut rig = make_rig(MockReporter::online());

    rig.board.set_level(ChannelId::Co, false);
    let r = rig.tick(0);
    let co = r.channel(ChannelId::Co).unwrap();
    assert!(co.digital && !co.over_baseline && co.alarm);
    assert!(r.gas);
    assert_eq!(r.reason, AlarmReason::Gas);
}

#[test]
fn active_high_comparator_trips_on_high_and_clears_on_low() {
    let mut config = test_config();
    for ch in config.channels.iter_mut().filter(|c| c.id == ChannelId::Co) {
        ch.threshold_polarity = Polarity::ActiveHigh;
    }
    let mut rig = make_rig_with(config, MockBoard::new(1.0), MockReporter::online());

    rig.board.set_level(ChannelId::Co, false);
    let calm = rig.tick(0);
    assert!(!calm.alarm);
    assert!(!calm.channel(ChannelId::Co).unwrap().digital);

    rig.board.set_level(ChannelId::Co, true);
    let tripped = rig.tick(100);
    let co = tripped.channel(ChannelId::Co).unwrap();
    assert!(co.digital && co.alarm);
    assert_eq!(tripped.reason, AlarmReason::Gas);

    rig.board.set_level(ChannelId::Co, false);
    assert!(!rig.tick(200).alarm);
    assert!(!rig.app.alarm_active());
}

#[test]
fn alarm_clears_as_soon_as_inputs_return_to_normal() {
    let mut rig = make_rig(MockReporter::online());

    rig.board.set_volts(ChannelId::Combustible, 2.0);
    assert!(rig.tick(0).alarm);
    rig.board.set_volts(ChannelId::Combustible, 1.0);
    assert!(!rig.tick(100).alarm);
    assert!(!rig.app.alarm_active());
}

// ── Priority and edges ────────────────────────────────────────

#[test]
fn fire_outranks_gas_and_edges_are_reported_once() {
    let mut rig = make_rig(MockReporter::online());
    rig.sink.clear();

    rig.board.fire_level = false;
    rig.board.set_volts(ChannelId::Co, 2.0);
    let r = rig.tick(0);
    assert!(r.fire && r.gas);
    assert_eq!(r.reason, AlarmReason::Fire);
    rig.tick(100);

    rig.board.fire_level = true;
    assert_eq!(rig.tick(200).reason, AlarmReason::Gas);

    rig.board.set_volts(ChannelId::Co, 1.0);
    assert_eq!(rig.tick(300).reason, AlarmReason::None);

    let edges: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::AlarmRaised(_) | AppEvent::AlarmCleared))
        .cloned()
        .collect();
    assert_eq!(
        edges,
        vec![
            AppEvent::AlarmRaised(AlarmReason::Fire),
            AppEvent::AlarmRaised(AlarmReason::Gas),
            AppEvent::AlarmCleared,
        ]
    );
}

// ── Concentration ─────────────────────────────────────────────

fn co_ppm(config: SystemConfig, humidity: Option<f32>) -> f32 {
    let mut board = MockBoard::new(1.0);
    board.humidity = humidity;
    let mut rig = make_rig_with(config, board, MockReporter::online());
    rig.board.set_volts(ChannelId::Co, 1.2);
    rig.tick(0).channel(ChannelId::Co).unwrap().ppm
}

#[test]
fn humidity_reading_applies_ambient_compensation() {
    let plain = co_ppm(test_config(), None);
    let compensated = co_ppm(test_config(), Some(40.0));
    assert!(plain > 0.0);
    // Dry air at 24.8 °C raises R0, so the same voltage reads as more gas.
    assert!(compensated > plain * 1.05, "{compensated} vs {plain}");

    let mut off = test_config();
    off.compensation = None;
    assert_eq!(co_ppm(off, Some(40.0)), plain);
}

#[test]
fn pollution_level_rises_with_sensor_voltage() {
    let mut rig = make_rig(MockReporter::online());

    rig.board.set_volts(ChannelId::Lpg, 0.5);
    let clean = rig.tick(0).channel(ChannelId::Lpg).unwrap().pollution_pct;
    assert_eq!(clean, 0.0);

    rig.board.set_volts(ChannelId::Lpg, 1.0);
    let at_baseline = rig.tick(100).channel(ChannelId::Lpg).unwrap().pollution_pct;
    assert!((51.0..52.0).contains(&at_baseline), "{at_baseline}");

    rig.board.set_volts(ChannelId::Lpg, 1.3);
    let lpg = *rig.tick(200).channel(ChannelId::Lpg).unwrap();
    assert!(lpg.pollution_pct > at_baseline && lpg.pollution_pct <= 100.0);
    assert!((lpg.baseline_v - 1.0).abs() < 0.01);
}

// ── Seismic ───────────────────────────────────────────────────

#[test]
fn sudden_step_is_a_quake_and_steady_tilt_is_not() {
    let mut rig = make_rig(MockReporter::online());

    assert!(!rig.tick(0).quake, "calibration primed the detector at 1 g");

    rig.board.set_z(1.62);
    let r = rig.tick(100);
    assert!(r.quake);
    assert_eq!(r.reason, AlarmReason::Quake);

    // Same orientation again: no change, no quake.
    assert!(!rig.tick(200).quake);
}

#[test]
fn implausible_jump_is_treated_as_glitch() {
    let mut rig = make_rig(MockReporter::online());
    rig.tick(0);

    rig.board.set_z(12.0);
    let r = rig.tick(100);
    assert!(!r.quake);
    assert!(!r.alarm);
}

#[test]
fn missing_accelerometer_and_thermometer_degrade_quietly() {
    let mut rig = make_rig(MockReporter::online());

    rig.board.accel_g = None;
    rig.board.temperature = None;
    let r = rig.tick(0);
    assert!(!r.quake);
    assert_eq!(r.temperature_c, 0.0);
}

// ── Reporting ─────────────────────────────────────────────────

#[test]
fn calm_reports_every_calm_interval_with_reading_summary() {
    let mut rig = make_rig(MockReporter::online());
    rig.sink.clear();

    for now in [0, 10_000, 29_999] {
        rig.tick(now);
    }
    assert!(rig.reporter.sent.is_empty());

    rig.tick(30_000);
    assert_eq!(rig.reporter.sent.len(), 1);
    let payload = rig.reporter.sent[0];
    assert!(!payload.alarm);
    assert!((payload.lpg_v - 1.0).abs() < 0.01);
    assert_eq!(payload.temp_c, 24.8);

    assert_eq!(rig.sink.count(|e| *e == AppEvent::ReportSent { alarm: false }), 1);
    let summary = rig
        .sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Reading(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap();
    assert!(summary.online);
    assert_eq!(summary.channels.len(), 3);
    for id in [ChannelId::Lpg, ChannelId::Combustible, ChannelId::Co] {
        let c = summary.channel(id).unwrap();
        assert!((c.baseline_v - 1.0).abs() < 0.01, "{id} baseline {}", c.baseline_v);
        assert!(c.pollution_pct > 0.0);
    }
    assert!(summary.max_pollution_pct >= summary.channel(ChannelId::Lpg).unwrap().pollution_pct);

    rig.tick(30_001);
    assert_eq!(rig.reporter.sent.len(), 1, "one report per window");
}

#[test]
fn active_alarm_reports_on_the_short_interval() {
    let mut rig = make_rig(MockReporter::online());
    rig.sink.clear();
    rig.board.set_volts(ChannelId::Lpg, 2.0);

    for now in [1_000, 3_000, 4_000, 6_000] {
        rig.tick(now);
    }
    assert_eq!(rig.reporter.sent.len(), 2);
    assert!(rig.reporter.sent.iter().all(|p| p.alarm && p.gas));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Reading(_))), 0);
}

#[test]
fn offline_report_is_skipped_and_the_window_still_advances() {
    let mut rig = make_rig(MockReporter::offline());

    rig.tick(30_000);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::ReportSkipped), 1);
    assert!(rig.reporter.sent.is_empty());

    rig.reporter.online = true;
    rig.tick(45_000);
    assert!(rig.reporter.sent.is_empty(), "next attempt waits a full interval");

    rig.tick(60_000);
    assert_eq!(rig.reporter.sent.len(), 1);
}

#[test]
fn failed_report_is_not_retried_early() {
    let mut rig = make_rig(MockReporter::failing(CommsError::HttpStatus(500)));

    rig.tick(30_000);
    rig.tick(30_500);
    assert_eq!(rig.reporter.sent.len(), 1);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::ReportFailed(CommsError::HttpStatus(500))), 1);

    rig.tick(60_000);
    assert_eq!(rig.reporter.sent.len(), 2);
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn display_shows_readings_when_calm_and_banner_in_alarm() {
    let mut rig = make_rig(MockReporter::online());
    let before = rig.display.frames.len();

    rig.tick(100);
    assert_eq!(rig.display.frames.len(), before, "refresh interval not yet elapsed");

    rig.tick(250);
    let calm = rig.display.last().unwrap().clone();
    assert!(calm[0].starts_with("LPG:1.0V"));
    assert_eq!(calm[1], "T:24.8C Wi:ON");
    assert_eq!(calm[3], "POL:52% G:1.0V");

    rig.board.set_volts(ChannelId::Combustible, 2.0);
    rig.tick(500);
    let alarm = rig.display.last().unwrap();
    assert_eq!(alarm[0], "!!! GAS LEAK !!!");
    assert_eq!(alarm[1], "ALERT REPORTED");
    assert_eq!(alarm[2], "F:N Q:N G:Y");
}

#[test]
fn offline_alarm_screen_says_not_reported() {
    let mut rig = make_rig(MockReporter::offline());
    rig.board.fire_level = false;
    rig.tick(250);
    let frame = rig.display.last().unwrap();
    assert_eq!(frame[0], "!!! FIRE !!!");
    assert_eq!(frame[1], "NOT REPORTED");
}

// ── Liveness ──────────────────────────────────────────────────

#[test]
fn watchdog_is_fed_once_per_cycle() {
    let mut rig = make_rig(MockReporter::offline());
    for i in 0..5 {
        rig.tick(i * 50);
    }
    assert_eq!(rig.watchdog.feeds, 5);
    assert_eq!(rig.app.cycle_count(), 5);
    assert!(rig.app.last_reading().is_some());
}
