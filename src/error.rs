//! Unified error types for the HazardWatch firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! can be carried inside [`AppEvent`](crate::app::events::AppEvent)s without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// The character display rejected a transaction.
    Display(DisplayError),
    /// Reporting to the server failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device never acknowledged its wake-up write.
    NotInitialised,
    /// An I²C transaction failed or was not acknowledged.
    BusFailed,
    /// The identity register did not match the expected part.
    WrongDevice(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialised => write!(f, "device not initialised"),
            Self::BusFailed => write!(f, "I2C transaction failed"),
            Self::WrongDevice(id) => write!(f, "unexpected device id 0x{:02X}", id),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The I²C backpack did not acknowledge a write.
    BusFailed,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFailed => write!(f, "I2C write failed"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Wi-Fi station is not associated.
    NotConnected,
    /// Endpoint URL could not be parsed.
    InvalidEndpoint,
    /// HTTPS requested on a build without a TLS stack.
    TlsUnsupported,
    /// Payload could not be serialised.
    Encode,
    /// Socket / HTTP client failure.
    Transport,
    /// Server answered with a non-2xx status.
    HttpStatus(u16),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "WiFi not connected"),
            Self::InvalidEndpoint => write!(f, "invalid endpoint URL"),
            Self::TlsUnsupported => write!(f, "HTTPS not supported on this target"),
            Self::Encode => write!(f, "payload encoding failed"),
            Self::Transport => write!(f, "HTTP transport error"),
            Self::HttpStatus(code) => write!(f, "server returned HTTP {code}"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
