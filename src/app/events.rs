//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::alarm::AlarmReason;
use crate::error::CommsError;
use crate::sensors::channel::{ChannelId, MAX_CHANNELS};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Warm-up progress, `done` of `total` ticks.
    CalibrationProgress { done: u32, total: u32 },

    /// A channel's clean-air baseline was fixed.
    Calibrated { id: ChannelId, baseline_v: f32 },

    /// Calibration finished and the control loop is about to run.
    Started { channels: u8 },

    /// The alarm went from clear to active, or its top reason changed.
    AlarmRaised(AlarmReason),

    /// Every condition cleared.
    AlarmCleared,

    /// A status payload was delivered.
    ReportSent { alarm: bool },

    /// Delivery failed; the next attempt waits a full interval.
    ReportFailed(CommsError),

    /// A report was due but the link was down.
    ReportSkipped,

    /// Periodic readings snapshot, emitted with every calm-state report.
    Reading(ReadingSummary),
}

/// Compact per-cycle numbers for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSummary {
    pub channels: heapless::Vec<ChannelSummary, MAX_CHANNELS>,
    pub max_ppm: f32,
    pub max_pollution_pct: f32,
    pub temperature_c: f32,
    pub online: bool,
}

impl ReadingSummary {
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelSummary> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// One gas channel against its clean-air baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub volts: f32,
    pub baseline_v: f32,
    pub ppm: f32,
    pub pollution_pct: f32,
}
