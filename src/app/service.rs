//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the calibrated gas channels, the seismic detector and
//! both schedulers.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌─────────────────────────┐ ──▶ DisplayPort
//!   MotionPort ──▶ │       AppService        │ ──▶ ReportPort
//!                  │ sample · alarm · sched  │ ──▶ WatchdogPort
//!                  └─────────────────────────┘ ──▶ EventSink
//! ```
//!
//! The only constructor is [`AppService::start`], which runs the clean-air
//! calibration.  A service that exists has baselines for every channel.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{info, warn};

use crate::alarm::{self, AlarmReading, AlarmReason, ChannelInput};
use crate::config::SystemConfig;
use crate::display;
use crate::scheduler::{DisplayScheduler, ReportScheduler};
use crate::sensors::calibration::Calibrator;
use crate::sensors::channel::{ChannelId, GasChannel, MAX_CHANNELS};
use crate::sensors::gas_model::{Ambient, Compensation};
use crate::sensors::motion::MotionDetector;
use crate::sensors::sampler::VoltageSampler;

use super::events::{AppEvent, ChannelSummary, ReadingSummary};
use super::ports::{DisplayPort, EventSink, MotionPort, ReportPort, SensorPort, WatchdogPort};
use super::telemetry::TelemetryPayload;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    channels: Vec<GasChannel, MAX_CHANNELS>,
    sampler: VoltageSampler,
    motion: MotionDetector,
    compensation: Option<Compensation>,
    reports: ReportScheduler,
    screen: DisplayScheduler,
    /// Reason of the last cycle, for edge-triggered alarm events.
    last_reason: AlarmReason,
    last_reading: Option<AlarmReading>,
    cycle_count: u64,
}

impl AppService {
    // ── Lifecycle ─────────────────────────────────────────────

    /// Calibrate every configured channel and build the service.
    ///
    /// Blocks for the calibration window, drawing a progress screen on
    /// `display` after every tick.
    pub fn start(
        config: SystemConfig,
        hw: &mut (impl SensorPort + MotionPort),
        delay: &mut impl DelayNs,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Self {
        let sampler = VoltageSampler::new(&config.sampler);
        let mut motion = MotionDetector::new(&config.seismic);
        let calibrator = Calibrator::new(&config.calibration);
        let tick_ms = calibrator.tick_ms();

        let baselines = calibrator.run(
            &config.channels,
            &sampler,
            &mut motion,
            hw,
            delay,
            |done, total| {
                let remaining_ms = (total - done) * tick_ms;
                let screen = display::render_calibration(
                    done,
                    total,
                    remaining_ms.div_ceil(1000),
                    &config.display,
                );
                display.show(&screen.lines());
                sink.emit(&AppEvent::CalibrationProgress { done, total });
            },
        );

        let mut channels = Vec::new();
        for (cfg, baseline) in config.channels.iter().zip(baselines) {
            sink.emit(&AppEvent::Calibrated { id: baseline.id, baseline_v: baseline.volts });
            if channels.push(GasChannel::new(cfg, baseline)).is_err() {
                warn!("channel table full, {} not monitored", cfg.id);
            }
        }

        display.show(&display::render_message("Calibration", "Done", &config.display).lines());
        sink.emit(&AppEvent::Started { channels: channels.len() as u8 });
        info!("AppService started with {} gas channel(s)", channels.len());

        Self {
            compensation: config.compensation.as_ref().map(Compensation::from_config),
            reports: ReportScheduler::new(&config.report),
            screen: DisplayScheduler::new(&config.display),
            channels,
            sampler,
            motion,
            config,
            last_reason: AlarmReason::None,
            last_reading: None,
            cycle_count: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle at monotonic time `now_ms`:
    /// read sensors → decide → display → report → feed watchdog.
    ///
    /// Returns the reading that drove this cycle.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + MotionPort),
        delay: &mut impl DelayNs,
        display: &mut impl DisplayPort,
        reporter: &mut impl ReportPort,
        watchdog: &mut impl WatchdogPort,
        sink: &mut impl EventSink,
    ) -> AlarmReading {
        self.cycle_count += 1;

        // 1. Sensors and decision
        let reading = self.measure(hw, delay);
        self.emit_alarm_edges(&reading, sink);

        // 2. Display
        let online = reporter.is_online();
        if self.screen.maybe_refresh(now_ms, reading.alarm) {
            let screen = display::render(&reading, online, &self.config.display);
            display.show(&screen.lines());
        }

        // 3. Report
        if self.reports.maybe_send(now_ms, reading.alarm) {
            Self::report(&reading, online, reporter, sink);
        }

        // 4. Liveness
        watchdog.feed();

        self.last_reading = Some(reading.clone());
        reading
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn channels(&self) -> &[GasChannel] {
        &self.channels
    }

    /// Clean-air baseline of `id`, if that channel is monitored.
    pub fn baseline(&self, id: ChannelId) -> Option<f32> {
        self.channels.iter().find(|c| c.id() == id).map(GasChannel::baseline_v)
    }

    pub fn last_reading(&self) -> Option<&AlarmReading> {
        self.last_reading.as_ref()
    }

    pub fn alarm_active(&self) -> bool {
        self.last_reason != AlarmReason::None
    }

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn measure(&mut self, hw: &mut (impl SensorPort + MotionPort), delay: &mut impl DelayNs) -> AlarmReading {
        let fire = self.config.fire_polarity.is_asserted(hw.fire_level());

        let temperature = hw.read_temperature();
        if temperature.is_none() {
            warn!("temperature unavailable, reporting 0.0");
        }
        // Compensation needs both ambient readings.
        let comp = match (self.compensation.as_ref(), temperature, hw.read_humidity()) {
            (Some(c), Some(t), Some(h)) => Some((c, Ambient { temperature_c: t, humidity_pct: h })),
            _ => None,
        };

        let mut inputs: Vec<ChannelInput, MAX_CHANNELS> = Vec::new();
        for ch in &self.channels {
            let volts = self.sampler.sample(|| hw.read_raw(ch.id()), delay);
            let digital = ch.polarity().is_asserted(hw.threshold_level(ch.id()));
            let input = ChannelInput {
                id: ch.id(),
                digital,
                volts,
                baseline_v: ch.baseline_v(),
                margin_v: ch.margin_v(),
                ppm: ch.model().concentration(volts, comp),
                pollution_pct: ch.model().pollution_percent(volts, comp),
            };
            if inputs.push(input).is_err() {
                warn!("input table full, {} dropped", ch.id());
            }
        }

        let quake = self.motion.poll(hw);
        alarm::evaluate(fire, &inputs, quake, temperature.unwrap_or(0.0))
    }

    fn emit_alarm_edges(&mut self, reading: &AlarmReading, sink: &mut impl EventSink) {
        if reading.reason == self.last_reason {
            return;
        }
        if reading.alarm {
            warn!("ALARM: {} (fire={} quake={} gas={})", reading.reason, reading.fire, reading.quake, reading.gas);
            sink.emit(&AppEvent::AlarmRaised(reading.reason));
        } else {
            info!("alarm cleared");
            sink.emit(&AppEvent::AlarmCleared);
        }
        self.last_reason = reading.reason;
    }

    fn report(reading: &AlarmReading, online: bool, reporter: &mut impl ReportPort, sink: &mut impl EventSink) {
        if online {
            match reporter.send(&TelemetryPayload::from(reading)) {
                Ok(()) => sink.emit(&AppEvent::ReportSent { alarm: reading.alarm }),
                Err(e) => sink.emit(&AppEvent::ReportFailed(e)),
            }
        } else {
            sink.emit(&AppEvent::ReportSkipped);
        }

        if !reading.alarm {
            sink.emit(&AppEvent::Reading(Self::summarize(reading, online)));
        }
    }

    fn summarize(reading: &AlarmReading, online: bool) -> ReadingSummary {
        ReadingSummary {
            channels: reading
                .channels
                .iter()
                .map(|c| ChannelSummary {
                    id: c.id,
                    volts: c.volts,
                    baseline_v: c.baseline_v,
                    ppm: c.ppm,
                    pollution_pct: c.pollution_pct,
                })
                .collect(),
            max_ppm: reading.max_ppm(),
            max_pollution_pct: reading.max_pollution_pct(),
            temperature_c: reading.temperature_c,
            online,
        }
    }
}
