//! Peripheral drivers and hardware initialisation.

pub mod hw_init;
pub mod lcd;
pub mod mpu6050;
pub mod watchdog;
