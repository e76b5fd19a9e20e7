//! HazardWatch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! adapters the firmware binary wires together. All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alarm;
pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod pins;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;
