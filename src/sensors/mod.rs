//! Sensor-side domain logic: sampling, calibration, gas and motion models.
//!
//! Nothing here touches hardware directly.  Raw reads arrive through the
//! [`SensorPort`](crate::app::ports::SensorPort) and
//! [`MotionPort`](crate::app::ports::MotionPort) traits.

pub mod calibration;
pub mod channel;
pub mod gas_model;
pub mod motion;
pub mod sampler;
