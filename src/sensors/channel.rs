//! Gas channel identity, input polarity and the calibrated channel record.
//!
//! A [`GasChannel`] can only be built from a [`Baseline`] produced by the
//! calibrator, so an uncalibrated channel never reaches the alarm engine.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ChannelConfig;
use crate::sensors::gas_model::GasModel;

/// Maximum number of gas channels on one board.
pub const MAX_CHANNELS: usize = 4;

/// Monitored gas lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    /// MQ-6, liquefied petroleum gas.
    Lpg,
    /// MQ-9, methane / propane / CO.
    Combustible,
    /// MQ-7, carbon monoxide.
    Co,
}

impl ChannelId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lpg => "LPG",
            Self::Combustible => "GAS",
            Self::Co => "CO",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Electrical level at which a digital threshold line means "tripped".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    /// Translate a raw pin level (`true` = high) into an asserted flag.
    pub const fn is_asserted(self, level_high: bool) -> bool {
        match self {
            Self::ActiveLow => !level_high,
            Self::ActiveHigh => level_high,
        }
    }
}

/// Clean-air reference voltage of one channel, established by calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub id: ChannelId,
    pub volts: f32,
}

/// A calibrated gas channel.  Baseline and margin are fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct GasChannel {
    id: ChannelId,
    baseline_v: f32,
    margin_v: f32,
    polarity: Polarity,
    model: GasModel,
}

impl GasChannel {
    pub fn new(config: &ChannelConfig, baseline: Baseline) -> Self {
        debug_assert_eq!(config.id, baseline.id);
        Self {
            id: config.id,
            baseline_v: baseline.volts,
            margin_v: config.margin_v,
            polarity: config.threshold_polarity,
            model: GasModel::from_config(&config.model),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn baseline_v(&self) -> f32 {
        self.baseline_v
    }

    pub fn margin_v(&self) -> f32 {
        self.margin_v
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn model(&self) -> &GasModel {
        &self.model
    }

    /// Voltage above which the software threshold trips.
    pub fn trip_voltage(&self) -> f32 {
        self.baseline_v + self.margin_v
    }
}
