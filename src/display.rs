//! Screen layouts for the character display.
//!
//! Pure formatting: every function returns a [`Screen`] of fixed-width rows
//! that the [`DisplayPort`](crate::app::ports::DisplayPort) writes out.
//!
//! ```text
//!   calm (16x4)          alarm (16x4)         calibration (16x4)
//!   ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//!   │LPG:1.2V CO:0.5V│   │!!! GAS LEAK !!!│   │Calibrating...  │
//!   │T:24.8C Wi:ON   │   │ALERT REPORTED  │   │Wait: 6s        │
//!   │PPM L:312 C:41  │   │F:N Q:N G:Y     │   │.....           │
//!   │POL:52% G:0.9V  │   │Temp:24.8C      │   │                │
//!   └────────────────┘   └────────────────┘   └────────────────┘
//! ```

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::alarm::AlarmReading;
use crate::config::{DisplayConfig, MAX_DISPLAY_COLS};
use crate::sensors::channel::ChannelId;

/// Maximum rows on a supported display.
pub const MAX_ROWS: usize = 4;

/// Length of the calibration progress bar.
const PROGRESS_DOTS: u32 = 10;

pub type Row = String<{ MAX_DISPLAY_COLS as usize }>;

/// One full screen of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    rows: Vec<Row, MAX_ROWS>,
}

impl Screen {
    fn with_geometry(cfg: &DisplayConfig) -> Layout {
        Layout {
            screen: Self::default(),
            cols: usize::from(cfg.cols).min(MAX_DISPLAY_COLS as usize),
            rows: usize::from(cfg.rows).min(MAX_ROWS),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Borrowed row slices, ready for [`DisplayPort::show`](crate::app::ports::DisplayPort::show).
    pub fn lines(&self) -> Vec<&str, MAX_ROWS> {
        self.rows.iter().map(String::as_str).collect()
    }
}

/// Row builder that enforces display geometry.
struct Layout {
    screen: Screen,
    cols: usize,
    rows: usize,
}

impl Layout {
    fn push(&mut self, args: fmt::Arguments<'_>) {
        if self.screen.rows.len() >= self.rows {
            return;
        }
        let mut scratch: String<48> = String::new();
        // Overflow only truncates the scratch buffer; the row is cut below anyway.
        let _ = scratch.write_fmt(args);
        let mut row = Row::new();
        for c in scratch.chars().take(self.cols) {
            if row.push(c).is_err() {
                break;
            }
        }
        let _ = self.screen.rows.push(row);
    }

    fn finish(self) -> Screen {
        self.screen
    }
}

fn yes_no(flag: bool) -> char {
    if flag { 'Y' } else { 'N' }
}

fn link_label(online: bool) -> &'static str {
    if online { "Wi:ON" } else { "Wi:OFF" }
}

/// Pick the alarm or calm layout for `reading`.
pub fn render(reading: &AlarmReading, online: bool, cfg: &DisplayConfig) -> Screen {
    if reading.alarm {
        render_alarm(reading, online, cfg)
    } else {
        render_calm(reading, online, cfg)
    }
}

/// Alarm banner: category label plus a reported / not-reported notice.
pub fn render_alarm(reading: &AlarmReading, online: bool, cfg: &DisplayConfig) -> Screen {
    let mut l = Screen::with_geometry(cfg);
    l.push(format_args!("{}", reading.reason.banner()));
    l.push(format_args!("{}", if online { "ALERT REPORTED" } else { "NOT REPORTED" }));
    l.push(format_args!(
        "F:{} Q:{} G:{}",
        yes_no(reading.fire),
        yes_no(reading.quake),
        yes_no(reading.gas)
    ));
    l.push(format_args!("Temp:{:.1}C", reading.temperature_c));
    l.finish()
}

/// Live readings.
pub fn render_calm(reading: &AlarmReading, online: bool, cfg: &DisplayConfig) -> Screen {
    let mut l = Screen::with_geometry(cfg);
    l.push(format_args!(
        "LPG:{:.1}V CO:{:.1}V",
        reading.volts(ChannelId::Lpg),
        reading.volts(ChannelId::Co)
    ));
    l.push(format_args!("T:{:.1}C {}", reading.temperature_c, link_label(online)));

    let ppm = |id| reading.channel(id).map_or(0.0, |c| c.ppm);
    l.push(format_args!("PPM L:{:.0} C:{:.0}", ppm(ChannelId::Lpg), ppm(ChannelId::Co)));
    l.push(format_args!(
        "POL:{:.0}% G:{:.1}V",
        reading.max_pollution_pct(),
        reading.volts(ChannelId::Combustible)
    ));
    l.finish()
}

/// Warm-up progress: `done` of `total` ticks, `remaining_secs` to go.
pub fn render_calibration(done: u32, total: u32, remaining_secs: u32, cfg: &DisplayConfig) -> Screen {
    let mut l = Screen::with_geometry(cfg);
    l.push(format_args!("Calibrating..."));
    l.push(format_args!("Wait: {}s", remaining_secs));
    let dots = if total == 0 { PROGRESS_DOTS } else { done.min(total) * PROGRESS_DOTS / total };
    let mut bar: String<{ PROGRESS_DOTS as usize }> = String::new();
    for _ in 0..dots {
        let _ = bar.push('.');
    }
    l.push(format_args!("{}", bar));
    l.finish()
}

/// Fixed status text (boot, calibration done, connecting).
pub fn render_message(title: &str, detail: &str, cfg: &DisplayConfig) -> Screen {
    let mut l = Screen::with_geometry(cfg);
    l.push(format_args!("{}", title));
    l.push(format_args!("{}", detail));
    l.finish()
}
