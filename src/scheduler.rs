//! Non-blocking interval schedulers for reporting and display refresh.
//!
//! Neither scheduler sleeps.  Each holds its last-action timestamp and
//! answers "is it time yet?" from an elapsed-time check, so a slow network
//! call delays the next action but never causes a burst of catch-up actions.
//!
//! ```text
//!   now ─────────────────────────────────────────────▶
//!        │◀── interval ──▶│◀── interval ──▶│
//!      sent              due              due
//! ```
//!
//! All timestamps are monotonic milliseconds.  Elapsed time is computed with
//! saturating subtraction, so a clock that appears to step backwards reads
//! as "no time has passed".

use log::debug;

use crate::config::{DisplayConfig, ReportConfig};

/// `now − last ≥ interval`, saturating.
pub fn interval_elapsed(now_ms: u64, last_ms: u64, interval_ms: u32) -> bool {
    now_ms.saturating_sub(last_ms) >= u64::from(interval_ms)
}

/// Decides when to push a status payload.
///
/// The alarm interval applies while an alarm is active, the calm interval
/// otherwise.  The caller records every attempt with
/// [`mark_sent`](Self::mark_sent) regardless of outcome: there is no retry
/// and no backoff, the next opportunity is the next interval.
#[derive(Debug, Clone)]
pub struct ReportScheduler {
    alarm_interval_ms: u32,
    calm_interval_ms: u32,
    last_sent_ms: u64,
}

impl ReportScheduler {
    pub fn new(cfg: &ReportConfig) -> Self {
        Self {
            alarm_interval_ms: cfg.alarm_interval_ms,
            calm_interval_ms: cfg.calm_interval_ms,
            last_sent_ms: 0,
        }
    }

    pub fn interval_ms(&self, alarm_active: bool) -> u32 {
        if alarm_active { self.alarm_interval_ms } else { self.calm_interval_ms }
    }

    pub fn last_sent_ms(&self) -> u64 {
        self.last_sent_ms
    }

    /// Whether a report should go out now.  Does not change state.
    pub fn should_send(&self, now_ms: u64, alarm_active: bool) -> bool {
        interval_elapsed(now_ms, self.last_sent_ms, self.interval_ms(alarm_active))
    }

    /// Record a send attempt at `now_ms`.
    pub fn mark_sent(&mut self, now_ms: u64) {
        self.last_sent_ms = now_ms;
    }

    /// [`should_send`](Self::should_send) followed by
    /// [`mark_sent`](Self::mark_sent) when due.
    pub fn maybe_send(&mut self, now_ms: u64, alarm_active: bool) -> bool {
        let due = self.should_send(now_ms, alarm_active);
        if due {
            debug!("report due at {} ms (alarm={})", now_ms, alarm_active);
            self.mark_sent(now_ms);
        }
        due
    }
}

/// Decides when to redraw the display.
#[derive(Debug, Clone)]
pub struct DisplayScheduler {
    alarm_interval_ms: u32,
    calm_interval_ms: u32,
    last_drawn_ms: u64,
}

impl DisplayScheduler {
    pub fn new(cfg: &DisplayConfig) -> Self {
        Self {
            alarm_interval_ms: cfg.alarm_refresh_ms,
            calm_interval_ms: cfg.calm_refresh_ms,
            last_drawn_ms: 0,
        }
    }

    pub fn last_drawn_ms(&self) -> u64 {
        self.last_drawn_ms
    }

    /// Returns `true` (and records `now_ms`) when a redraw is due.
    pub fn maybe_refresh(&mut self, now_ms: u64, alarm_active: bool) -> bool {
        let interval = if alarm_active { self.alarm_interval_ms } else { self.calm_interval_ms };
        if interval_elapsed(now_ms, self.last_drawn_ms, interval) {
            self.last_drawn_ms = now_ms;
            true
        } else {
            false
        }
    }
}
