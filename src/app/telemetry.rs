//! Status payload POSTed to the server.
//!
//! Wire format (JSON, `Content-Type: application/json`):
//!
//! ```json
//! {"alarm":true,"fire":false,"gas":true,"quake":false,"lpg_v":1.92,"co_v":0.41,"temp_c":27.3}
//! ```

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmReading;
use crate::error::CommsError;
use crate::sensors::channel::ChannelId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub alarm: bool,
    pub fire: bool,
    pub gas: bool,
    pub quake: bool,
    /// LPG channel voltage (0.0 when not monitored).
    pub lpg_v: f32,
    /// CO channel voltage (0.0 when not monitored).
    pub co_v: f32,
    pub temp_c: f32,
}

impl TelemetryPayload {
    pub fn to_json(&self) -> Result<std::vec::Vec<u8>, CommsError> {
        serde_json::to_vec(self).map_err(|_| CommsError::Encode)
    }
}

impl From<&AlarmReading> for TelemetryPayload {
    fn from(r: &AlarmReading) -> Self {
        Self {
            alarm: r.alarm,
            fire: r.fire,
            gas: r.gas,
            quake: r.quake,
            lpg_v: r.volts(ChannelId::Lpg),
            co_v: r.volts(ChannelId::Co),
            temp_c: r.temperature_c,
        }
    }
}
