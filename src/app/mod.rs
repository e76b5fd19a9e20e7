//! Application core — pure domain logic, zero I/O.
//!
//! This module holds the HazardWatch control cycle: calibration at
//! startup, then sample → decide → display → report on every tick.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod telemetry;
