//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ADC/GPIO, accelerometer, display, HTTP reporter,
//! watchdog, event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the domain core never touches hardware directly and host tests can plug
//! in recording fakes.

use crate::app::telemetry::TelemetryPayload;
use crate::error::CommsError;
use crate::sensors::channel::ChannelId;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Gas and flame sensor lines.
///
/// Digital lines are reported as raw electrical levels (`true` = high);
/// polarity is applied by the domain from configuration.
pub trait SensorPort {
    /// One raw ADC conversion of the channel's analog output.
    /// An unreadable channel returns 0.
    fn read_raw(&mut self, id: ChannelId) -> u16;

    /// Level of the channel's comparator output.
    fn threshold_level(&mut self, id: ChannelId) -> bool;

    /// Level of the flame sensor's comparator output.
    fn fire_level(&mut self) -> bool;

    /// Relative humidity (%), when a hygrometer is fitted.
    fn read_humidity(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Motion port (driven adapter: accelerometer → domain)
// ───────────────────────────────────────────────────────────────

/// 3-axis accelerometer.  `None` means the device is unavailable.
pub trait MotionPort {
    /// Signed raw counts for X, Y, Z.
    fn read_accel(&mut self) -> Option<[i16; 3]>;

    /// Die temperature in °C.
    fn read_temperature(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character LCD)
// ───────────────────────────────────────────────────────────────

/// Fixed-geometry text display.  Implementations log and swallow bus
/// errors; the control loop never waits on the display.
pub trait DisplayPort {
    /// Replace the whole screen with `lines` (row 0 first).  Missing rows
    /// are blanked; text beyond the display width is cut.
    fn show(&mut self, lines: &[&str]);
}

// ───────────────────────────────────────────────────────────────
// Report port (driven adapter: domain → remote server)
// ───────────────────────────────────────────────────────────────

/// Network sink for status payloads.
pub trait ReportPort {
    /// Whether the network link is up.  Drives the `Wi:ON/OFF` indicator.
    fn is_online(&self) -> bool;

    /// Deliver one payload.  Blocks for the duration of the request.
    fn send(&mut self, payload: &TelemetryPayload) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Watchdog port
// ───────────────────────────────────────────────────────────────

/// Liveness signal to an external watchdog.  Fed once per control cycle.
pub trait WatchdogPort {
    fn feed(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating a [`SystemConfig`](crate::config::SystemConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Config document failed to parse.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
