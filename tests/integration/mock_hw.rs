//! Mock adapters for integration tests.
//!
//! Each mock records what the service did to it so tests can assert on
//! the full history without touching real ADC/GPIO/I2C hardware.

use embedded_hal::delay::DelayNs;
use hazardwatch::app::events::AppEvent;
use hazardwatch::app::ports::{DisplayPort, EventSink, MotionPort, ReportPort, SensorPort, WatchdogPort};
use hazardwatch::app::telemetry::TelemetryPayload;
use hazardwatch::error::CommsError;
use hazardwatch::sensors::channel::ChannelId;

/// Accelerometer counts per g used by the test configuration.
pub const LSB_PER_G: f32 = 1_000.0;

const VREF: f32 = 3.3;
const ADC_MAX: f32 = 4095.0;

fn slot(id: ChannelId) -> usize {
    match id {
        ChannelId::Lpg => 0,
        ChannelId::Combustible => 1,
        ChannelId::Co => 2,
    }
}

// ── MockBoard ─────────────────────────────────────────────────

/// Sensor board with settable analog, digital and motion inputs.
///
/// Pin levels are electrical: every line idles high (active-low modules).
pub struct MockBoard {
    raw: [u16; 3],
    levels: [bool; 3],
    pub fire_level: bool,
    pub accel_g: Option<[f32; 3]>,
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
}

#[allow(dead_code)]
impl MockBoard {
    /// Every channel at `volts`, all lines idle, board level and still.
    pub fn new(volts: f32) -> Self {
        let mut board = Self {
            raw: [0; 3],
            levels: [true; 3],
            fire_level: true,
            accel_g: Some([0.0, 0.0, 1.0]),
            temperature: Some(24.8),
            humidity: None,
        };
        for id in [ChannelId::Lpg, ChannelId::Combustible, ChannelId::Co] {
            board.set_volts(id, volts);
        }
        board
    }

    pub fn set_volts(&mut self, id: ChannelId, volts: f32) {
        self.raw[slot(id)] = (volts / VREF * ADC_MAX).round() as u16;
    }

    /// Drive the comparator line of `id` (`true` = high).
    pub fn set_level(&mut self, id: ChannelId, high: bool) {
        self.levels[slot(id)] = high;
    }

    pub fn set_z(&mut self, g: f32) {
        self.accel_g = Some([0.0, 0.0, g]);
    }
}

impl SensorPort for MockBoard {
    fn read_raw(&mut self, id: ChannelId) -> u16 {
        self.raw[slot(id)]
    }

    fn threshold_level(&mut self, id: ChannelId) -> bool {
        self.levels[slot(id)]
    }

    fn fire_level(&mut self) -> bool {
        self.fire_level
    }

    fn read_humidity(&mut self) -> Option<f32> {
        self.humidity
    }
}

impl MotionPort for MockBoard {
    fn read_accel(&mut self) -> Option<[i16; 3]> {
        self.accel_g.map(|axes| axes.map(|g| (g * LSB_PER_G) as i16))
    }

    fn read_temperature(&mut self) -> Option<f32> {
        self.temperature
    }
}

// ── NoDelay ───────────────────────────────────────────────────

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── RecordingDisplay ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Vec<String>> {
        self.frames.last()
    }
}

impl DisplayPort for RecordingDisplay {
    fn show(&mut self, lines: &[&str]) {
        self.frames.push(lines.iter().map(|l| (*l).to_owned()).collect());
    }
}

// ── MockReporter ──────────────────────────────────────────────

pub struct MockReporter {
    pub online: bool,
    /// Error returned by every send, if set.
    pub fail_with: Option<CommsError>,
    pub sent: Vec<TelemetryPayload>,
}

#[allow(dead_code)]
impl MockReporter {
    pub fn online() -> Self {
        Self { online: true, fail_with: None, sent: Vec::new() }
    }

    pub fn offline() -> Self {
        Self { online: false, ..Self::online() }
    }

    pub fn failing(err: CommsError) -> Self {
        Self { fail_with: Some(err), ..Self::online() }
    }
}

impl ReportPort for MockReporter {
    fn is_online(&self) -> bool {
        self.online
    }

    fn send(&mut self, payload: &TelemetryPayload) -> Result<(), CommsError> {
        self.sent.push(*payload);
        match self.fail_with {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ── CountingWatchdog ──────────────────────────────────────────

#[derive(Default)]
pub struct CountingWatchdog {
    pub feeds: u32,
}

impl WatchdogPort for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
