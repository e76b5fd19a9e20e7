//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Exposes the gas-sensor ADC channels, the comparator lines and the
//! accelerometer through [`SensorPort`] and [`MotionPort`].  This is the
//! only module in the system that reads sensor hardware.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: ADC and GPIO reads go through the `hw_init` helpers.
//! On host/test: values come from static atomics set with the `sim_set_*`
//! functions.  The accelerometer is a real driver on both targets, generic
//! over the I²C bus.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{MotionPort, SensorPort};
use crate::drivers::mpu6050::Mpu6050;
use crate::sensors::channel::ChannelId;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Simulation inputs ─────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: [AtomicU16; 3] = [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)];
// Comparator lines idle high (active-low wiring).
#[cfg(not(target_os = "espidf"))]
static SIM_LEVEL: [AtomicBool; 3] = [AtomicBool::new(true), AtomicBool::new(true), AtomicBool::new(true)];
#[cfg(not(target_os = "espidf"))]
static SIM_FIRE_LEVEL: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
const fn sim_index(id: ChannelId) -> usize {
    match id {
        ChannelId::Lpg => 0,
        ChannelId::Combustible => 1,
        ChannelId::Co => 2,
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(id: ChannelId, raw: u16) {
    SIM_ADC[sim_index(id)].store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_threshold_level(id: ChannelId, high: bool) {
    SIM_LEVEL[sim_index(id)].store(high, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fire_level(high: bool) {
    SIM_FIRE_LEVEL.store(high, Ordering::Relaxed);
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that combines all sensor hardware behind port traits.
pub struct HardwareAdapter<I> {
    mpu: Option<Mpu6050<I>>,
    /// Set after the first accelerometer failure so the log is not flooded.
    mpu_fault_logged: bool,
}

impl<I: I2c> HardwareAdapter<I> {
    /// `mpu` is `None` when the accelerometer did not answer at boot;
    /// motion and temperature then read as unavailable.
    pub fn new(mpu: Option<Mpu6050<I>>) -> Self {
        Self { mpu, mpu_fault_logged: false }
    }

    /// Bring up `mpu`; a device that fails its identity check or wake-up
    /// is dropped and motion reads as unavailable from then on.
    pub fn with_accelerometer(mut mpu: Mpu6050<I>) -> Self {
        match mpu.init() {
            Ok(()) => Self::new(Some(mpu)),
            Err(e) => {
                warn!("MPU6050 init failed ({}), seismic detection disabled", e);
                Self::new(None)
            }
        }
    }

    pub fn has_accelerometer(&self) -> bool {
        self.mpu.is_some()
    }

    fn note_mpu_fault(&mut self, what: &str) {
        if !self.mpu_fault_logged {
            warn!("MPU6050 {} read failed; treating as unavailable", what);
            self.mpu_fault_logged = true;
        }
    }

    #[cfg(target_os = "espidf")]
    fn adc(&self, id: ChannelId) -> u16 {
        hw_init::adc1_read(pins::adc_channel(id))
    }

    #[cfg(not(target_os = "espidf"))]
    fn adc(&self, id: ChannelId) -> u16 {
        SIM_ADC[sim_index(id)].load(Ordering::Relaxed)
    }

    #[cfg(target_os = "espidf")]
    fn level(&self, id: ChannelId) -> bool {
        hw_init::gpio_read(pins::threshold_gpio(id))
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self, id: ChannelId) -> bool {
        SIM_LEVEL[sim_index(id)].load(Ordering::Relaxed)
    }

    #[cfg(target_os = "espidf")]
    fn fire(&self) -> bool {
        hw_init::gpio_read(pins::FIRE_DO_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn fire(&self) -> bool {
        SIM_FIRE_LEVEL.load(Ordering::Relaxed)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I: I2c> SensorPort for HardwareAdapter<I> {
    fn read_raw(&mut self, id: ChannelId) -> u16 {
        self.adc(id)
    }

    fn threshold_level(&mut self, id: ChannelId) -> bool {
        self.level(id)
    }

    fn fire_level(&mut self) -> bool {
        self.fire()
    }

    fn read_humidity(&mut self) -> Option<f32> {
        None
    }
}

// ── MotionPort implementation ─────────────────────────────────

impl<I: I2c> MotionPort for HardwareAdapter<I> {
    fn read_accel(&mut self) -> Option<[i16; 3]> {
        match self.mpu.as_mut()?.read_accel() {
            Ok(raw) => Some(raw),
            Err(_) => {
                self.note_mpu_fault("accel");
                None
            }
        }
    }

    fn read_temperature(&mut self) -> Option<f32> {
        match self.mpu.as_mut()?.read_temperature() {
            Ok(t) => Some(t),
            Err(_) => {
                self.note_mpu_fault("temperature");
                None
            }
        }
    }
}
