//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART in production).  Records are pipe-separated
//! with a fixed tag first, so a serial capture can be grepped by kind.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::CalibrationProgress { done, total } => {
                debug!("CALIB | tick {}/{}", done, total);
            }
            AppEvent::Calibrated { id, baseline_v } => {
                info!("CALIB | {} baseline={:.3}V", id, baseline_v);
            }
            AppEvent::Started { channels } => {
                info!("START | channels={}", channels);
            }
            AppEvent::AlarmRaised(reason) => {
                warn!("ALARM | raised reason={}", reason);
            }
            AppEvent::AlarmCleared => {
                info!("ALARM | cleared");
            }
            AppEvent::ReportSent { alarm } => {
                info!("REPORT | sent alarm={}", alarm);
            }
            AppEvent::ReportFailed(e) => {
                warn!("REPORT | failed: {}", e);
            }
            AppEvent::ReportSkipped => {
                warn!("REPORT | skipped, link down");
            }
            AppEvent::Reading(r) => {
                info!(
                    "READ | peak={:.0}ppm pollution={:.2}% | T={:.1}\u{00b0}C | link={}",
                    r.max_ppm,
                    r.max_pollution_pct,
                    r.temperature_c,
                    if r.online { "up" } else { "down" },
                );
                for c in &r.channels {
                    debug!(
                        "READ | {} {:.2}V base={:.2}V {:.0}ppm {:.2}%",
                        c.id, c.volts, c.baseline_v, c.ppm, c.pollution_pct
                    );
                }
            }
        }
    }
}
