//! Alarm decision engine.
//!
//! Pure combinational logic, re-evaluated from scratch every cycle:
//!
//! ```text
//!   channel_alarm = digital  OR  volts > baseline + margin
//!   alarm         = fire  OR  quake  OR  any(channel_alarm)
//! ```
//!
//! The digital flag is the sensor module's own comparator; it trips a
//! channel even when the software threshold has not.  The reason tag is a
//! display priority (fire, then quake, then gas).  It never hides a
//! condition: every flag is still carried in the [`AlarmReading`].

use core::fmt;

use heapless::Vec;

use crate::sensors::channel::{ChannelId, MAX_CHANNELS};

/// Highest-priority active condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmReason {
    Fire,
    Quake,
    Gas,
    None,
}

impl AlarmReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Quake => "quake",
            Self::Gas => "gas",
            Self::None => "none",
        }
    }

    /// Banner text for the display.
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Fire => "!!! FIRE !!!",
            Self::Quake => "!!! QUAKE !!!",
            Self::Gas => "!!! GAS LEAK !!!",
            Self::None => "ALL CLEAR",
        }
    }
}

impl fmt::Display for AlarmReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for one channel in one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelInput {
    pub id: ChannelId,
    /// Comparator output, polarity already applied.
    pub digital: bool,
    pub volts: f32,
    pub baseline_v: f32,
    pub margin_v: f32,
    pub ppm: f32,
    /// Relative pollution level, 0..=100.
    pub pollution_pct: f32,
}

/// Per-channel outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReading {
    pub id: ChannelId,
    pub volts: f32,
    pub baseline_v: f32,
    pub ppm: f32,
    pub pollution_pct: f32,
    pub digital: bool,
    pub over_baseline: bool,
    pub alarm: bool,
}

/// Point-in-time snapshot handed to the display and the reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmReading {
    pub fire: bool,
    pub quake: bool,
    /// Any gas channel in alarm.
    pub gas: bool,
    pub alarm: bool,
    pub reason: AlarmReason,
    pub channels: Vec<ChannelReading, MAX_CHANNELS>,
    pub temperature_c: f32,
}

impl AlarmReading {
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelReading> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Channel voltage, 0.0 when the channel is not monitored.
    pub fn volts(&self, id: ChannelId) -> f32 {
        self.channel(id).map_or(0.0, |c| c.volts)
    }

    pub fn max_ppm(&self) -> f32 {
        self.channels.iter().map(|c| c.ppm).fold(0.0, f32::max)
    }

    /// Worst pollution level across channels.
    pub fn max_pollution_pct(&self) -> f32 {
        self.channels.iter().map(|c| c.pollution_pct).fold(0.0, f32::max)
    }
}

/// Software-or-hardware threshold for one channel.
pub fn channel_alarm(digital: bool, volts: f32, baseline_v: f32, margin_v: f32) -> bool {
    digital || volts > baseline_v + margin_v
}

/// Reason tag for a set of flags.
pub fn reason(fire: bool, quake: bool, gas: bool) -> AlarmReason {
    if fire {
        AlarmReason::Fire
    } else if quake {
        AlarmReason::Quake
    } else if gas {
        AlarmReason::Gas
    } else {
        AlarmReason::None
    }
}

/// Combine every detector into one reading.
pub fn evaluate(fire: bool, channels: &[ChannelInput], quake: bool, temperature_c: f32) -> AlarmReading {
    let channels: Vec<ChannelReading, MAX_CHANNELS> = channels
        .iter()
        .take(MAX_CHANNELS)
        .map(|c| {
            let over_baseline = c.volts > c.baseline_v + c.margin_v;
            ChannelReading {
                id: c.id,
                volts: c.volts,
                baseline_v: c.baseline_v,
                ppm: c.ppm,
                pollution_pct: c.pollution_pct,
                digital: c.digital,
                over_baseline,
                alarm: channel_alarm(c.digital, c.volts, c.baseline_v, c.margin_v),
            }
        })
        .collect();

    let gas = channels.iter().any(|c| c.alarm);
    AlarmReading {
        fire,
        quake,
        gas,
        alarm: fire || quake || gas,
        reason: reason(fire, quake, gas),
        channels,
        temperature_c,
    }
}
